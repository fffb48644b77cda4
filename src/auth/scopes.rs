//! OAuth scope sets.
//!
//! Scopes are requested in the authorization URL and granted back in the
//! token response; a [`Session`](crate::Session) compares the two to decide
//! whether the merchant has to re-authorize.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A set of OAuth scopes with implied-scope expansion.
///
/// `write_foo` implies `read_foo`, and `unauthenticated_write_foo` implies
/// `unauthenticated_read_foo`. Parsing expands implied scopes so two sets
/// compare equal whenever they grant the same access.
///
/// `Display` and `Serialize` produce a sorted, comma-separated string, which
/// is also the `scope` value sent in the authorization URL.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::AuthScopes;
///
/// let scopes: AuthScopes = "write_orders, read_products".parse().unwrap();
/// assert!(scopes.has("read_orders"));
/// assert_eq!(scopes.to_string(), "read_orders,read_products,write_orders");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AuthScopes {
    scopes: BTreeSet<String>,
}

impl AuthScopes {
    /// Creates an empty scope set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the scope set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns `true` if `scope` (or a scope implying it) is in the set.
    #[must_use]
    pub fn has(&self, scope: &str) -> bool {
        self.scopes.contains(scope.trim())
    }

    /// Returns `true` if this set contains every scope in `other`.
    #[must_use]
    pub fn covers(&self, other: &Self) -> bool {
        other.scopes.is_subset(&self.scopes)
    }

    /// Returns the scopes without the entries implied by others.
    ///
    /// `read_products,write_products` compresses to `write_products`.
    #[must_use]
    pub fn compressed(&self) -> Vec<&str> {
        let implied: BTreeSet<String> = self
            .scopes
            .iter()
            .filter_map(|scope| Self::implied_scope(scope))
            .collect();

        self.scopes
            .iter()
            .filter(|scope| !implied.contains(*scope))
            .map(String::as_str)
            .collect()
    }

    /// Returns an iterator over the scopes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(String::as_str)
    }

    fn from_validated(scopes: BTreeSet<String>) -> Self {
        let implied: Vec<String> = scopes
            .iter()
            .filter_map(|scope| Self::implied_scope(scope))
            .collect();

        let mut scopes = scopes;
        scopes.extend(implied);
        Self { scopes }
    }

    fn implied_scope(scope: &str) -> Option<String> {
        scope
            .strip_prefix("unauthenticated_write_")
            .map(|rest| format!("unauthenticated_read_{rest}"))
            .or_else(|| {
                scope
                    .strip_prefix("write_")
                    .map(|rest| format!("read_{rest}"))
            })
    }
}

impl FromStr for AuthScopes {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut scopes = BTreeSet::new();

        for scope in s.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !scope.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(ConfigError::InvalidScopes {
                    reason: format!("Invalid characters in scope: '{scope}'"),
                });
            }
            scopes.insert(scope.to_string());
        }

        Ok(Self::from_validated(scopes))
    }
}

impl From<Vec<String>> for AuthScopes {
    fn from(scopes: Vec<String>) -> Self {
        Self::from_validated(
            scopes
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }
}

impl fmt::Display for AuthScopes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.iter().collect();
        f.write_str(&joined.join(","))
    }
}

impl Serialize for AuthScopes {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AuthScopes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

//! OAuth state (nonce) generation.
//!
//! The state parameter ties an authorization redirect to the browser that
//! started it. `begin` issues an [`AuthState`], stores its value in a signed,
//! short-lived cookie, and sends the same value to the platform in the
//! authorize URL. The callback accepts the returned `state` only if it equals
//! the cookie value.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::auth::oauth::{AuthState, StateParam};
//! use chrono::Duration;
//!
//! let nonce = StateParam::new();
//! assert_eq!(nonce.as_ref().len(), 32);
//!
//! let state = AuthState::issue(Duration::seconds(60));
//! assert!(!state.is_expired_at(state.created_at()));
//! ```

use chrono::{DateTime, Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;

/// A random, URL-safe nonce.
///
/// 32 characters drawn from `[A-Za-z0-9]` with the thread-local CSPRNG,
/// which gives roughly 190 bits of entropy.
#[derive(Clone, PartialEq, Eq)]
pub struct StateParam(String);

impl StateParam {
    /// Length of generated nonces.
    pub const LENGTH: usize = 32;

    /// Generates a new nonce.
    #[must_use]
    pub fn new() -> Self {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(Self::LENGTH)
            .map(char::from)
            .collect();

        Self(nonce)
    }

    /// Consumes the nonce and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Default for StateParam {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for StateParam {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Nonces end up in logs via `{:?}` far too easily.
impl fmt::Debug for StateParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateParam(*****)")
    }
}

/// A nonce with its issue and expiry times.
///
/// Lives only in the signed state cookie between `begin` and `callback`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    value: StateParam,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthState {
    /// Issues a fresh state valid for `ttl` from now.
    #[must_use]
    pub fn issue(ttl: Duration) -> Self {
        let created_at = Utc::now();
        Self {
            value: StateParam::new(),
            created_at,
            expires_at: created_at + ttl,
        }
    }

    /// Returns the nonce.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_ref()
    }

    /// Returns when the state was issued.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the state stops being accepted.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` if the state is no longer valid at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// Verify state types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<StateParam>();
    assert_send_sync::<AuthState>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_state_param_is_32_alphanumeric_chars() {
        let state = StateParam::new();
        assert_eq!(state.as_ref().len(), StateParam::LENGTH);
        assert!(state.as_ref().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_state_param_is_unique_over_large_sample() {
        let nonces: HashSet<String> = (0..100_000)
            .map(|_| StateParam::new().into_inner())
            .collect();
        assert_eq!(nonces.len(), 100_000);
    }

    #[test]
    fn test_state_param_debug_is_masked() {
        let state = StateParam::new();
        let debug = format!("{state:?}");
        assert!(!debug.contains(state.as_ref()));
    }

    #[test]
    fn test_state_param_display_is_raw_value() {
        let state = StateParam::new();
        assert_eq!(state.to_string(), state.as_ref());
    }

    #[test]
    fn test_auth_state_expiry() {
        let state = AuthState::issue(Duration::seconds(60));

        assert_eq!(state.expires_at() - state.created_at(), Duration::seconds(60));
        assert!(!state.is_expired_at(state.created_at() + Duration::seconds(59)));
        assert!(state.is_expired_at(state.created_at() + Duration::seconds(60)));
    }

    #[test]
    fn test_auth_state_values_differ() {
        let first = AuthState::issue(Duration::seconds(60));
        let second = AuthState::issue(Duration::seconds(60));
        assert_ne!(first.value(), second.value());
    }
}

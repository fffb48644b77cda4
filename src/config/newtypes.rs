//! Validated newtype wrappers for configuration values.
//!
//! These wrappers validate their contents on construction so that the OAuth
//! flow only ever sees well-formed credentials, shops and hosts.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated Shopify API key (the OAuth `client_id`).
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated Shopify API secret key.
///
/// The secret signs nothing on its own; it keys the callback HMAC, the
/// session-token JWT check and, by default, the signed cookies.
///
/// # Security
///
/// `Debug` output is masked as `ApiSecretKey(*****)`.
///
/// ```rust
/// use shopify_app_auth::ApiSecretKey;
///
/// let secret = ApiSecretKey::new("my-secret").unwrap();
/// assert_eq!(format!("{:?}", secret), "ApiSecretKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiSecretKey(String);

impl ApiSecretKey {
    /// Creates a new validated API secret key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiSecretKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiSecretKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiSecretKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecretKey(*****)")
    }
}

/// A validated shop domain.
///
/// A `ShopDomain` is the only form in which a shop reaches session ids,
/// cookie values or the authorization URL.
///
/// # Accepted Formats
///
/// - `shop-name`, normalized to `shop-name.myshopify.com`
/// - `shop-name.myshopify.com`, `shop-name.myshopify.io`,
///   `shop-name.shopify.com` and `shop-name.shop.dev`, used as-is
/// - `admin.shopify.com/store/shop-name`, normalized to
///   `shop-name.myshopify.com`
///
/// A leading `https://` and trailing slashes are ignored, and the value is
/// lowercased.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::ShopDomain;
///
/// let domain = ShopDomain::new("my-store").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// assert_eq!(domain.shop_name(), "my-store");
///
/// let domain = ShopDomain::new("shop1.myshopify.io").unwrap();
/// assert_eq!(domain.as_ref(), "shop1.myshopify.io");
///
/// let domain = ShopDomain::new("https://admin.shopify.com/store/my-store").unwrap();
/// assert_eq!(domain.as_ref(), "my-store.myshopify.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShopDomain {
    full_domain: String,
    shop_name_end: usize,
}

impl ShopDomain {
    const DEFAULT_SUFFIX: &'static str = ".myshopify.com";
    const SUFFIXES: [&'static str; 4] = [
        ".myshopify.com",
        ".myshopify.io",
        ".shopify.com",
        ".shop.dev",
    ];
    const ADMIN_PREFIX: &'static str = "admin.shopify.com/store/";

    /// Creates a new validated shop domain.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShopDomain`] if the domain is invalid.
    pub fn new(domain: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = domain.into();
        let lowered = raw.trim().to_lowercase();
        let domain = lowered
            .strip_prefix("https://")
            .or_else(|| lowered.strip_prefix("http://"))
            .unwrap_or(lowered.as_str())
            .trim_end_matches('/');

        if domain.is_empty() {
            return Err(ConfigError::InvalidShopDomain { domain: raw });
        }

        let (shop_name, full_domain) = if let Some(store) = domain.strip_prefix(Self::ADMIN_PREFIX)
        {
            let name = store.split('/').next().unwrap_or_default();
            (name.to_string(), format!("{name}{}", Self::DEFAULT_SUFFIX))
        } else if let Some(name) = Self::SUFFIXES
            .iter()
            .find_map(|suffix| domain.strip_suffix(suffix))
        {
            (name.to_string(), domain.to_string())
        } else if domain.contains(['.', '/']) {
            return Err(ConfigError::InvalidShopDomain { domain: raw });
        } else {
            (
                domain.to_string(),
                format!("{domain}{}", Self::DEFAULT_SUFFIX),
            )
        };

        if !Self::is_valid_shop_name(&shop_name) {
            return Err(ConfigError::InvalidShopDomain { domain: raw });
        }

        Ok(Self {
            shop_name_end: shop_name.len(),
            full_domain,
        })
    }

    /// Returns the shop name portion of the domain.
    ///
    /// For `my-store.myshopify.com`, this returns `my-store`.
    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.full_domain[..self.shop_name_end]
    }

    fn is_valid_shop_name(name: &str) -> bool {
        if name.is_empty() || name.starts_with('-') || name.ends_with('-') {
            return false;
        }

        name.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.full_domain
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_domain)
    }
}

impl Serialize for ShopDomain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.full_domain)
    }
}

impl<'de> Deserialize<'de> for ShopDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}

/// A validated host URL for the application.
///
/// Supplies the `hostScheme` and `hostName` the redirect URI is built from.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::HostUrl;
///
/// let url = HostUrl::new("https://myapp.example.com").unwrap();
/// assert_eq!(url.scheme(), "https");
/// assert_eq!(url.host_name(), Some("myapp.example.com"));
/// assert_eq!(url.origin(), "https://myapp.example.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostUrl {
    url: String,
    scheme_end: usize,
    host_start: usize,
    host_end: usize,
    authority_end: usize,
}

impl HostUrl {
    /// Creates a new validated host URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostUrl`] if the URL is invalid.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let url = url.into().trim().to_string();

        let scheme_end = url
            .find("://")
            .ok_or_else(|| ConfigError::InvalidHostUrl { url: url.clone() })?;

        let scheme = &url[..scheme_end];
        if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidHostUrl { url });
        }

        let host_start = scheme_end + 3;
        if host_start >= url.len() {
            return Err(ConfigError::InvalidHostUrl { url });
        }

        // Host ends at port, path, query, or end of string
        let remainder = &url[host_start..];
        let host_end = remainder
            .find([':', '/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);
        let authority_end = remainder
            .find(['/', '?', '#'])
            .map_or(url.len(), |i| host_start + i);

        if host_start == host_end {
            return Err(ConfigError::InvalidHostUrl { url });
        }

        Ok(Self {
            url,
            scheme_end,
            host_start,
            host_end,
            authority_end,
        })
    }

    /// Builds a host URL from separate scheme and host name values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostUrl`] if the combination is invalid.
    pub fn from_parts(scheme: &str, host_name: &str) -> Result<Self, ConfigError> {
        Self::new(format!("{scheme}://{host_name}"))
    }

    /// Returns the URL scheme (e.g., "https").
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.url[..self.scheme_end]
    }

    /// Returns the host name portion of the URL.
    #[must_use]
    pub fn host_name(&self) -> Option<&str> {
        let host = &self.url[self.host_start..self.host_end];
        if host.is_empty() {
            None
        } else {
            Some(host)
        }
    }

    /// Returns `scheme://host[:port]` without any path.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.url[..self.authority_end]
    }
}

impl AsRef<str> for HostUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_rejects_empty_string() {
        assert!(matches!(ApiKey::new(""), Err(ConfigError::EmptyApiKey)));
    }

    #[test]
    fn test_api_secret_key_masks_value_in_debug() {
        let secret = ApiSecretKey::new("super-secret-key").unwrap();
        let debug_output = format!("{:?}", secret);
        assert_eq!(debug_output, "ApiSecretKey(*****)");
        assert!(!debug_output.contains("super-secret-key"));
    }

    #[test]
    fn test_shop_domain_normalizes_short_format() {
        let domain = ShopDomain::new("my-store").unwrap();
        assert_eq!(domain.as_ref(), "my-store.myshopify.com");
        assert_eq!(domain.shop_name(), "my-store");
    }

    #[test]
    fn test_shop_domain_accepts_platform_suffixes() {
        for input in [
            "my-store.myshopify.com",
            "my-store.myshopify.io",
            "my-store.shopify.com",
            "my-store.shop.dev",
        ] {
            let domain = ShopDomain::new(input).unwrap();
            assert_eq!(domain.as_ref(), input);
            assert_eq!(domain.shop_name(), "my-store");
        }
    }

    #[test]
    fn test_shop_domain_strips_scheme_and_trailing_slash() {
        let domain = ShopDomain::new("https://My-Store.myshopify.com/").unwrap();
        assert_eq!(domain.as_ref(), "my-store.myshopify.com");
    }

    #[test]
    fn test_shop_domain_converts_admin_url() {
        let domain = ShopDomain::new("admin.shopify.com/store/my-store").unwrap();
        assert_eq!(domain.as_ref(), "my-store.myshopify.com");

        let domain = ShopDomain::new("https://admin.shopify.com/store/my-store/apps").unwrap();
        assert_eq!(domain.as_ref(), "my-store.myshopify.com");
    }

    #[test]
    fn test_shop_domain_rejects_invalid_domains() {
        assert!(ShopDomain::new("").is_err());
        assert!(ShopDomain::new("my store").is_err());
        assert!(ShopDomain::new("my_store").is_err());
        assert!(ShopDomain::new("-my-store").is_err());
        assert!(ShopDomain::new("my-store-").is_err());
        assert!(ShopDomain::new("my-store.otherdomain.com").is_err());
        assert!(ShopDomain::new("evil.com/my-store.myshopify.com").is_err());
        assert!(ShopDomain::new("a.b.myshopify.com").is_err());
        assert!(ShopDomain::new(".myshopify.com").is_err());
        assert!(ShopDomain::new("admin.shopify.com/store/").is_err());
    }

    #[test]
    fn test_shop_domain_error_reports_raw_input() {
        match ShopDomain::new("bad domain!") {
            Err(ConfigError::InvalidShopDomain { domain }) => assert_eq!(domain, "bad domain!"),
            other => panic!("Expected InvalidShopDomain, got {other:?}"),
        }
    }

    #[test]
    fn test_host_url_validates_format() {
        let url = HostUrl::new("https://myapp.example.com").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_name(), Some("myapp.example.com"));

        let url = HostUrl::new("http://localhost:3000").unwrap();
        assert_eq!(url.host_name(), Some("localhost"));
        assert_eq!(url.origin(), "http://localhost:3000");

        let url = HostUrl::new("https://myapp.example.com/base/").unwrap();
        assert_eq!(url.origin(), "https://myapp.example.com");
    }

    #[test]
    fn test_host_url_from_parts() {
        let url = HostUrl::from_parts("https", "myapp.example.com").unwrap();
        assert_eq!(url.as_ref(), "https://myapp.example.com");
        assert!(HostUrl::from_parts("", "myapp.example.com").is_err());
    }

    #[test]
    fn test_host_url_rejects_invalid() {
        assert!(HostUrl::new("myapp.example.com").is_err());
        assert!(HostUrl::new("https://").is_err());
        assert!(HostUrl::new("://example.com").is_err());
    }

    #[test]
    fn test_shop_domain_serde_uses_full_domain() {
        let domain = ShopDomain::new("my-store").unwrap();
        let json = serde_json::to_string(&domain).unwrap();
        assert_eq!(json, r#""my-store.myshopify.com""#);

        let restored: ShopDomain = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, domain);

        assert!(serde_json::from_str::<ShopDomain>(r#""not a shop!""#).is_err());
    }
}

//! The OAuth flow object.
//!
//! [`OAuthFlow`] bundles the three things both handlers need: the app
//! configuration, the cookie signing keys, and a [`TokenExchanger`]. It holds
//! no mutable state, so one instance can serve every request concurrently.
//!
//! The handlers themselves live next to this file:
//! [`begin`](OAuthFlow::begin) in `begin_auth.rs`,
//! [`callback`](OAuthFlow::callback) in `validate_callback.rs`, and
//! [`current_session_id`](OAuthFlow::current_session_id) in
//! `current_session.rs`.

use crate::auth::oauth::token_exchange::{ReqwestTokenExchanger, TokenExchanger};
use crate::auth::oauth::OAuthError;
use crate::auth::Session;
use crate::config::ShopifyConfig;
use crate::http::{CookieKeys, ResponseHeaders};
use chrono::Duration;
use std::fmt;

/// Name of the signed cookie carrying the OAuth state between redirects.
pub const STATE_COOKIE_NAME: &str = "shopify_app_state";

/// Name of the signed cookie carrying the session id for non-embedded apps.
pub const SESSION_COOKIE_NAME: &str = "shopify_app_session";

/// How long a state issued by `begin` is accepted by `callback`.
#[must_use]
pub fn state_ttl() -> Duration {
    Duration::seconds(60)
}

/// Maximum distance between the callback `timestamp` and the current time.
#[must_use]
pub fn timestamp_tolerance() -> Duration {
    Duration::seconds(90)
}

/// Where a single browser's authorization attempt stands.
///
/// The flow keeps no server-side record of this; the state is implied by the
/// state cookie's lifecycle and is exposed for logging and documentation.
///
/// ```text
/// NotStarted --begin--> PendingCallback --callback ok--> Completed
///                              |
///                              +--------callback error--> Failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowState {
    /// No state cookie has been issued.
    NotStarted,
    /// The state cookie is set and the browser is at the platform.
    PendingCallback,
    /// The callback verified and produced a session.
    Completed,
    /// The callback was rejected.
    Failed,
}

impl FlowState {
    /// Returns a short lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::PendingCallback => "pending_callback",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`OAuthFlow::begin`]: a redirect to the platform.
///
/// Copy `status` and every entry of `headers` onto the response. `headers`
/// already contains `Location` and the state `Set-Cookie`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeginAuthResult {
    /// Always `302`.
    pub status: u16,
    /// The authorization URL.
    pub location: String,
    /// `Location` and `Set-Cookie` headers.
    pub headers: ResponseHeaders,
}

/// Outcome of [`OAuthFlow::callback`].
#[derive(Clone, Debug)]
pub struct CallbackResult {
    /// The new session. Persist it; the library does not.
    pub session: Session,
    /// `Set-Cookie` headers: the state cookie removal and, for
    /// non-embedded apps, the session cookie.
    pub headers: ResponseHeaders,
}

/// The authorization code flow.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::{ApiKey, ApiSecretKey, HostUrl, OAuthFlow, ShopifyConfig};
///
/// let config = ShopifyConfig::builder()
///     .api_key(ApiKey::new("api-key").unwrap())
///     .api_secret_key(ApiSecretKey::new("secret").unwrap())
///     .host(HostUrl::new("https://myapp.example.com").unwrap())
///     .scopes("read_products".parse().unwrap())
///     .build()
///     .unwrap();
///
/// let flow = OAuthFlow::from_config(config).unwrap();
/// let redirect = flow.begin("my-store", "/auth/callback", false).unwrap();
///
/// assert_eq!(redirect.status, 302);
/// assert!(redirect
///     .location
///     .starts_with("https://my-store.myshopify.com/admin/oauth/authorize?"));
/// ```
#[derive(Clone, Debug)]
pub struct OAuthFlow<E = ReqwestTokenExchanger> {
    pub(crate) config: ShopifyConfig,
    pub(crate) cookie_keys: CookieKeys,
    pub(crate) exchanger: E,
}

impl<E: TokenExchanger> OAuthFlow<E> {
    /// Creates a flow from explicit parts.
    #[must_use]
    pub const fn new(config: ShopifyConfig, cookie_keys: CookieKeys, exchanger: E) -> Self {
        Self {
            config,
            cookie_keys,
            exchanger,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ShopifyConfig {
        &self.config
    }

    /// Returns the cookie signing keys.
    #[must_use]
    pub const fn cookie_keys(&self) -> &CookieKeys {
        &self.cookie_keys
    }

    /// Returns the token exchanger.
    #[must_use]
    pub const fn exchanger(&self) -> &E {
        &self.exchanger
    }

    pub(crate) fn ensure_not_private(&self) -> Result<(), OAuthError> {
        if self.config.is_private_app() {
            Err(OAuthError::PrivateApp)
        } else {
            Ok(())
        }
    }
}

impl OAuthFlow<ReqwestTokenExchanger> {
    /// Creates a flow with cookie keys derived from the config secrets and
    /// the default `reqwest` exchanger.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenExchangeFailed`] if the HTTP client cannot
    /// be built.
    pub fn from_config(config: ShopifyConfig) -> Result<Self, OAuthError> {
        let exchanger = ReqwestTokenExchanger::new(&config)?;
        let cookie_keys = CookieKeys::from_config(&config);
        Ok(Self::new(config, cookie_keys, exchanger))
    }
}

// Verify OAuthFlow is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthFlow>();
    assert_send_sync::<CallbackResult>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiKey, ApiSecretKey};

    #[test]
    fn test_flow_state_labels() {
        assert_eq!(FlowState::NotStarted.to_string(), "not_started");
        assert_eq!(FlowState::PendingCallback.as_str(), "pending_callback");
        assert_eq!(FlowState::Completed.as_str(), "completed");
        assert_eq!(FlowState::Failed.as_str(), "failed");
    }

    #[test]
    fn test_time_windows() {
        assert_eq!(state_ttl().num_seconds(), 60);
        assert_eq!(timestamp_tolerance().num_seconds(), 90);
    }

    #[test]
    fn test_from_config_builds_flow() {
        let config = ShopifyConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .api_secret_key(ApiSecretKey::new("secret").unwrap())
            .is_private_app(true)
            .build()
            .unwrap();

        let flow = OAuthFlow::from_config(config).unwrap();
        assert!(matches!(
            flow.ensure_not_private(),
            Err(OAuthError::PrivateApp)
        ));
    }
}

//! OAuth error types.
//!
//! Every failure in the flow is terminal: the flow never retries and never
//! returns a partially built [`Session`](crate::Session). Messages never
//! include the expected state value or any secret, so they are safe to log.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::auth::oauth::OAuthError;
//!
//! let error = OAuthError::CookieNotFound {
//!     name: "shopify_app_state".to_string(),
//! };
//! assert!(error.to_string().contains("shopify_app_state"));
//! ```

use crate::error::ConfigError;
use thiserror::Error;

/// Errors that can occur during OAuth operations.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::auth::oauth::OAuthError;
///
/// fn status_for(err: &OAuthError) -> u16 {
///     match err {
///         OAuthError::CookieNotFound { .. } | OAuthError::InvalidOAuthCallback { .. } => 403,
///         OAuthError::MissingRequiredArgument { .. } | OAuthError::InvalidShop { .. } => 400,
///         OAuthError::TokenExchangeFailed { .. } => 502,
///         _ => 500,
///     }
/// }
///
/// assert_eq!(status_for(&OAuthError::MissingHostConfig), 500);
/// ```
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Private (custom store) apps cannot run the OAuth flow.
    #[error("Cannot perform OAuth for private apps")]
    PrivateApp,

    /// A required input was absent or empty.
    #[error("Missing required argument: '{argument}'")]
    MissingRequiredArgument {
        /// Name of the missing argument.
        argument: String,
    },

    /// The shop value is not a valid shop domain.
    #[error("Invalid shop domain: '{shop}'")]
    InvalidShop {
        /// The rejected shop value.
        shop: String,
    },

    /// A required signed cookie was absent, forged or expired.
    #[error("Cannot complete OAuth process. Could not find a valid '{name}' cookie")]
    CookieNotFound {
        /// Name of the cookie that could not be verified.
        name: String,
    },

    /// The callback failed HMAC, timestamp or state verification.
    #[error("Invalid OAuth callback: {reason}")]
    InvalidOAuthCallback {
        /// Which check failed.
        reason: String,
    },

    /// The access token request failed or returned an unusable body.
    #[error("Token exchange failed with status {status}: {message}")]
    TokenExchangeFailed {
        /// HTTP status of the token endpoint response (0 if no response).
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// `begin` needs a host to build the redirect URI.
    #[error("Host URL must be configured in ShopifyConfig for OAuth")]
    MissingHostConfig,

    /// A session token could not be decoded or validated.
    #[error("Invalid session token: {reason}")]
    InvalidJwt {
        /// Why the token was rejected.
        reason: String,
    },

    /// Configuration values were invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl OAuthError {
    pub(crate) fn missing(argument: &str) -> Self {
        Self::MissingRequiredArgument {
            argument: argument.to_string(),
        }
    }

    pub(crate) fn invalid_callback(reason: impl Into<String>) -> Self {
        Self::InvalidOAuthCallback {
            reason: reason.into(),
        }
    }
}

// Verify OAuthError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OAuthError>();
};

//! Authorization code exchange.
//!
//! The callback trades the one-time `code` for an access token with a single
//! `POST https://<shop>/admin/oauth/access_token`. The call sits behind the
//! [`TokenExchanger`] trait so hosts can supply their own HTTP stack or a
//! fake in tests; [`ReqwestTokenExchanger`] is the default.
//!
//! # Example
//!
//! ```rust,no_run
//! use shopify_app_auth::auth::oauth::{AccessTokenRequest, ReqwestTokenExchanger, TokenExchanger};
//! use shopify_app_auth::{ShopDomain, ShopifyConfig, ApiKey, ApiSecretKey};
//!
//! # async fn run() -> Result<(), shopify_app_auth::OAuthError> {
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("secret").unwrap())
//!     .build()?;
//! let exchanger = ReqwestTokenExchanger::new(&config)?;
//! let shop = ShopDomain::new("my-store")?;
//!
//! let response = exchanger
//!     .exchange_code(&shop, &AccessTokenRequest::new(&config, "authorization-code"))
//!     .await?;
//! println!("online: {}", response.is_online());
//! # Ok(())
//! # }
//! ```

use crate::auth::oauth::OAuthError;
use crate::auth::AccessTokenResponse;
use crate::config::{ShopDomain, ShopifyConfig};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Crate version, reported in the `User-Agent` header.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default timeout for the token request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON body of the access token request.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct AccessTokenRequest {
    /// The app's API key.
    pub client_id: String,
    /// The app's API secret key.
    pub client_secret: String,
    /// The authorization code from the callback.
    pub code: String,
}

impl AccessTokenRequest {
    /// Builds a request with the primary credentials from `config`.
    #[must_use]
    pub fn new(config: &ShopifyConfig, code: impl Into<String>) -> Self {
        Self {
            client_id: config.api_key().as_ref().to_string(),
            client_secret: config.api_secret_key().as_ref().to_string(),
            code: code.into(),
        }
    }
}

impl fmt::Debug for AccessTokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenRequest")
            .field("client_id", &self.client_id)
            .field("client_secret", &"*****")
            .field("code", &"*****")
            .finish()
    }
}

/// Exchanges an authorization code for an access token.
///
/// Implementations make at most one network call and must not retry; every
/// failure maps to [`OAuthError::TokenExchangeFailed`].
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Performs the exchange for `shop`.
    async fn exchange_code(
        &self,
        shop: &ShopDomain,
        request: &AccessTokenRequest,
    ) -> Result<AccessTokenResponse, OAuthError>;
}

#[async_trait]
impl<T: TokenExchanger + ?Sized> TokenExchanger for Arc<T> {
    async fn exchange_code(
        &self,
        shop: &ShopDomain,
        request: &AccessTokenRequest,
    ) -> Result<AccessTokenResponse, OAuthError> {
        (**self).exchange_code(shop, request).await
    }
}

/// [`TokenExchanger`] backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct ReqwestTokenExchanger {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl ReqwestTokenExchanger {
    /// Creates an exchanger with the default 30 second timeout.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenExchangeFailed`] if the HTTP client cannot
    /// be built.
    pub fn new(config: &ShopifyConfig) -> Result<Self, OAuthError> {
        Self::with_timeout(config, DEFAULT_TIMEOUT)
    }

    /// Creates an exchanger with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenExchangeFailed`] if the HTTP client cannot
    /// be built.
    pub fn with_timeout(config: &ShopifyConfig, timeout: Duration) -> Result<Self, OAuthError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}Shopify App Auth v{SDK_VERSION} | Rust {rust_version}");

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| OAuthError::TokenExchangeFailed {
                status: 0,
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: None,
        })
    }

    /// Sends requests to `base_url` instead of `https://<shop>`.
    ///
    /// Used to point the exchanger at a proxy or a local mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn token_url(&self, shop: &ShopDomain) -> String {
        self.base_url.as_ref().map_or_else(
            || format!("https://{shop}/admin/oauth/access_token"),
            |base| format!("{base}/admin/oauth/access_token"),
        )
    }
}

#[async_trait]
impl TokenExchanger for ReqwestTokenExchanger {
    async fn exchange_code(
        &self,
        shop: &ShopDomain,
        request: &AccessTokenRequest,
    ) -> Result<AccessTokenResponse, OAuthError> {
        let response = self
            .client
            .post(self.token_url(shop))
            .header("Accept", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed {
                status: 0,
                message: format!("Network error: {e}"),
            })?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::debug!(shop = %shop, status, "Access token request rejected");
            return Err(OAuthError::TokenExchangeFailed {
                status,
                message: error_body,
            });
        }

        response
            .json::<AccessTokenResponse>()
            .await
            .map_err(|e| OAuthError::TokenExchangeFailed {
                status,
                message: format!("Failed to parse token response: {e}"),
            })
    }
}

// Verify exchanger types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReqwestTokenExchanger>();
    assert_send_sync::<AccessTokenRequest>();
};

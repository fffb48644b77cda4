//! Starting the authorization code flow.
//!
//! `begin` issues a fresh state, stores it in a signed cookie scoped to the
//! callback path, and redirects the browser to the platform's authorize
//! endpoint:
//!
//! ```text
//! https://<shop>/admin/oauth/authorize
//!     ?client_id=<api key>
//!     &scope=<scopes, implied ones dropped>
//!     &redirect_uri=<host origin + callback path>
//!     &state=<nonce>
//!     &grant_options%5B%5D=<per-user | empty>
//! ```

use crate::auth::oauth::flow::{state_ttl, BeginAuthResult, FlowState, OAuthFlow, STATE_COOKIE_NAME};
use crate::auth::oauth::state::AuthState;
use crate::auth::oauth::token_exchange::TokenExchanger;
use crate::auth::oauth::OAuthError;
use crate::config::{ShopDomain, ShopifyConfig};
use crate::http::{CookieOptions, SameSite, SignedCookieJar};

impl<E: TokenExchanger> OAuthFlow<E> {
    /// Begins OAuth for `shop` and returns the redirect to send.
    ///
    /// `is_online` requests a user-scoped (`per-user`) token; otherwise the
    /// platform issues an offline token.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::PrivateApp`] for private apps
    /// - [`OAuthError::MissingRequiredArgument`] if `shop` or `callback_path`
    ///   is empty
    /// - [`OAuthError::InvalidShop`] if `shop` is not a valid shop domain
    /// - [`OAuthError::MissingHostConfig`] if the config has no host
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
    /// let flow = OAuthFlow::from_config(config).unwrap();
    ///
    /// let redirect = flow.begin("my-store", "/auth/callback", true).unwrap();
    /// assert!(redirect.location.contains("grant_options%5B%5D=per-user"));
    /// assert!(redirect
    ///     .headers
    ///     .set_cookies()
    ///     .any(|c| c.starts_with("shopify_app_state=")));
    /// ```
    pub fn begin(
        &self,
        shop: &str,
        callback_path: &str,
        is_online: bool,
    ) -> Result<BeginAuthResult, OAuthError> {
        self.ensure_not_private()?;

        if shop.trim().is_empty() {
            return Err(OAuthError::missing("shop"));
        }
        if callback_path.trim().is_empty() {
            return Err(OAuthError::missing("callback_path"));
        }

        let shop_domain = ShopDomain::new(shop).map_err(|_| OAuthError::InvalidShop {
            shop: shop.to_string(),
        })?;
        let host = self.config.host().ok_or(OAuthError::MissingHostConfig)?;

        let callback_path = normalize_path(callback_path);
        let redirect_uri = format!("{}{callback_path}", host.origin());
        let state = AuthState::issue(state_ttl());

        let mut jar = SignedCookieJar::from_request(&self.cookie_keys, None);
        jar.set_signed(
            STATE_COOKIE_NAME,
            state.value(),
            &CookieOptions {
                expires: Some(state.expires_at()),
                same_site: SameSite::Lax,
                secure: true,
                http_only: true,
                path: callback_path.clone(),
            },
        );

        let location = authorization_url(
            &self.config,
            &shop_domain,
            &redirect_uri,
            state.value(),
            is_online,
        );
        let mut headers = jar.into_headers();
        headers.append("Location", location.clone());

        tracing::info!(
            shop = %shop_domain,
            is_online,
            callback_path = %callback_path,
            flow_state = %FlowState::PendingCallback,
            "Beginning OAuth"
        );

        Ok(BeginAuthResult {
            status: 302,
            location,
            headers,
        })
    }
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn authorization_url(
    config: &ShopifyConfig,
    shop: &ShopDomain,
    redirect_uri: &str,
    state: &str,
    is_online: bool,
) -> String {
    let grant_options = if is_online { "per-user" } else { "" };

    format!(
        "https://{shop}/admin/oauth/authorize?client_id={}&scope={}&redirect_uri={}&state={}&grant_options%5B%5D={grant_options}",
        urlencoding::encode(config.api_key().as_ref()),
        urlencoding::encode(&config.scopes().compressed().join(",")),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(state),
    )
}

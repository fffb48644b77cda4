//! The OAuth 2.0 authorization code flow.
//!
//! # Flow
//!
//! 1. **Begin** ([`OAuthFlow::begin`]): issue a nonce, store it in a signed
//!    cookie scoped to the callback path, and redirect the merchant to the
//!    platform's authorize page.
//! 2. **Callback** ([`OAuthFlow::callback`]): take the state cookie, verify
//!    the query HMAC, the timestamp and the state, exchange the code for a
//!    token, and build a [`Session`](crate::Session).
//! 3. **Later requests** ([`OAuthFlow::current_session_id`]): recover the
//!    session id from the session token (embedded) or the signed session
//!    cookie (non-embedded) so the host can load the stored session.
//!
//! The library keeps no server-side state between the two redirects; the
//! signed state cookie is the only correlation, and the callback deletes it.
//!
//! # Security
//!
//! - Callback HMACs and state values are compared in constant time.
//! - Cookies are HMAC-signed with the app secret and carry their own expiry.
//! - `old_api_secret_key` is accepted wherever the primary secret is, so a
//!   key rotation does not break flows already in progress.
//! - Errors never contain the expected state or any secret.
//!
//! # Example
//!
//! ```rust,no_run
//! use shopify_app_auth::http::RawRequest;
//! use shopify_app_auth::{ApiKey, ApiSecretKey, HostUrl, OAuthError, OAuthFlow, ShopifyConfig};
//!
//! # async fn run() -> Result<(), OAuthError> {
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("your-api-key")?)
//!     .api_secret_key(ApiSecretKey::new("your-secret")?)
//!     .host(HostUrl::new("https://your-app.com")?)
//!     .scopes("read_products,write_orders".parse()?)
//!     .is_embedded(false)
//!     .build()?;
//! let flow = OAuthFlow::from_config(config)?;
//!
//! // GET /auth?shop=example-shop
//! let redirect = flow.begin("example-shop", "/auth/callback", true)?;
//! // respond with redirect.status and redirect.headers
//!
//! // GET /auth/callback?code=...&hmac=...
//! let request = RawRequest::new("https://your-app.com/auth/callback?code=...")
//!     .with_header("Cookie", "shopify_app_state=...");
//! let done = flow.callback(&request).await?;
//! // persist done.session, respond with done.headers
//! # Ok(())
//! # }
//! ```

mod auth_query;
mod begin_auth;
mod current_session;
mod error;
mod flow;
pub mod hmac;
mod jwt_payload;
mod state;
mod token_exchange;
mod validate_callback;

pub use auth_query::{signable_string, AuthQuery};
pub use error::OAuthError;
pub use flow::{
    state_ttl, timestamp_tolerance, BeginAuthResult, CallbackResult, FlowState, OAuthFlow,
    SESSION_COOKIE_NAME, STATE_COOKIE_NAME,
};
pub use hmac::{compute_signature, constant_time_compare, validate_hmac, verify_hmac};
pub use jwt_payload::JwtPayload;
pub use state::{AuthState, StateParam};
pub use token_exchange::{
    AccessTokenRequest, ReqwestTokenExchanger, TokenExchanger, DEFAULT_TIMEOUT, SDK_VERSION,
};

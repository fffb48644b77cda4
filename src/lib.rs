//! # Shopify App Auth
//!
//! OAuth and session derivation for apps built on the Shopify Admin API.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ShopifyConfig`] and [`ShopifyConfigBuilder`]
//! - Validated newtypes for credentials, shop domains and the app host
//! - OAuth scope handling with implied scope support
//! - The OAuth 2.0 authorization code flow via [`OAuthFlow`]
//! - HMAC verification of callback query strings
//! - Signed cookies that carry state between redirects
//! - Deterministic (embedded) and random (non-embedded) session ids
//! - Session token decoding for embedded apps
//!
//! The crate does not store sessions and does not make Admin API calls. The
//! only network call it makes is the authorization code exchange, behind the
//! [`TokenExchanger`](auth::oauth::TokenExchanger) trait.
//!
//! ## Quick Start
//!
//! ```rust
//! use shopify_app_auth::{ApiKey, ApiSecretKey, HostUrl, OAuthFlow, ShopifyConfig};
//!
//! let config = ShopifyConfig::builder()
//!     .api_key(ApiKey::new("your-api-key").unwrap())
//!     .api_secret_key(ApiSecretKey::new("your-api-secret").unwrap())
//!     .host(HostUrl::new("https://your-app.com").unwrap())
//!     .scopes("read_products,write_orders".parse().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let flow = OAuthFlow::from_config(config).unwrap();
//! let redirect = flow.begin("example-shop", "/auth/callback", false).unwrap();
//!
//! // Send a 302 with every header in `redirect.headers`.
//! assert_eq!(redirect.status, 302);
//! assert!(redirect.headers.location().is_some());
//! ```
//!
//! ## Plugging In a Web Framework
//!
//! The flow reads requests through [`http::IncomingRequest`] and returns
//! [`http::ResponseHeaders`]. Implement the trait for your framework's
//! request type, or wrap the pieces in an [`http::RawRequest`]:
//!
//! ```rust,ignore
//! let request = RawRequest::new(req.uri().to_string())
//!     .with_header("Cookie", req.headers().get("cookie")?.to_str()?);
//! let done = flow.callback(&request).await?;
//! store.save(&done.session).await?;
//! for (name, value) in &done.headers {
//!     response.headers_mut().append(name, value.parse()?);
//! }
//! ```
//!
//! ## Sessions
//!
//! ```rust
//! use shopify_app_auth::{Session, ShopDomain};
//!
//! let session = Session::offline(
//!     "offline_my-store.myshopify.com",
//!     ShopDomain::new("my-store").unwrap(),
//!     "state",
//!     "access-token",
//!     "read_products".parse().unwrap(),
//! );
//!
//! // Sessions serialize for storage and re-check their invariants on load
//! let json = serde_json::to_string(&session).unwrap();
//! let restored: Session = serde_json::from_str(&json).unwrap();
//! assert_eq!(restored, session);
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (`info` when a flow begins and
//! completes, `warn` when a callback is rejected) and never installs a
//! subscriber. Tokens, secrets and state values are never logged.
//!
//! ## Design Principles
//!
//! - **No global state**: configuration is instance-based and passed explicitly
//! - **Fail-fast validation**: all newtypes validate on construction
//! - **Thread-safe**: all public types are `Send + Sync`
//! - **Stateless handlers**: the signed state cookie is the only link between
//!   `begin` and `callback`

pub mod auth;
pub mod config;
pub mod error;
pub mod http;

// Re-export public types at crate root for convenience
pub use auth::{AccessTokenResponse, AssociatedUser, AuthScopes, OnlineAccessInfo, Session};
pub use config::{ApiKey, ApiSecretKey, HostUrl, ShopDomain, ShopifyConfig, ShopifyConfigBuilder};
pub use error::ConfigError;

// Re-export OAuth types for convenience
pub use auth::oauth::{
    AuthQuery, BeginAuthResult, CallbackResult, FlowState, OAuthError, OAuthFlow,
    ReqwestTokenExchanger, TokenExchanger,
};

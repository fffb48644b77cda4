//! Authentication types: scopes, sessions, session ids and the OAuth flow.
//!
//! # Overview
//!
//! - [`AuthScopes`]: a set of OAuth scopes with implied scope handling
//! - [`Session`]: the result of a completed OAuth callback
//! - [`AssociatedUser`]: the staff member behind an online session
//! - [`session_id`]: deterministic and random session id derivation
//! - [`oauth`]: the authorization code flow itself
//!
//! # Session Types
//!
//! - **Offline sessions** are shop-scoped, never expire and have the id
//!   `offline_<shop>`. Use them for background work.
//! - **Online sessions** are tied to one staff member, expire, and carry
//!   [`OnlineAccessInfo`].
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::{Session, ShopDomain};
//!
//! let session = Session::offline(
//!     "offline_my-store.myshopify.com",
//!     ShopDomain::new("my-store").unwrap(),
//!     "nonce",
//!     "access-token",
//!     "read_products".parse().unwrap(),
//! );
//!
//! // Offline sessions don't expire
//! assert!(!session.expired());
//! ```

mod associated_user;
pub mod oauth;
mod scopes;
pub mod session;
pub mod session_id;

pub use associated_user::AssociatedUser;
pub use scopes::AuthScopes;
pub use session::{AccessTokenResponse, OnlineAccessInfo, Session};
pub use session_id::SessionIdMode;

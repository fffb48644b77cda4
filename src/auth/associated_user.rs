//! The staff member behind an online session.
//!
//! The token endpoint includes an `associated_user` object only when the
//! merchant granted per-user (online) access. Its presence is what makes a
//! token response, and therefore a [`Session`](crate::Session), online.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::AssociatedUser;
//!
//! let user: AssociatedUser = serde_json::from_str(r#"{"id": 999}"#).unwrap();
//! assert_eq!(user.id, 999);
//! assert!(user.email.is_empty());
//! ```

use serde::{Deserialize, Serialize};

/// A Shopify staff member associated with an online access token.
///
/// Only `id` is required when deserializing; the remaining fields default
/// when the platform omits them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociatedUser {
    /// The Shopify user ID.
    pub id: u64,

    /// The user's first name.
    #[serde(default)]
    pub first_name: String,

    /// The user's last name.
    #[serde(default)]
    pub last_name: String,

    /// The user's email address.
    #[serde(default)]
    pub email: String,

    /// Whether the user's email has been verified.
    #[serde(default)]
    pub email_verified: bool,

    /// Whether the user owns the shop account.
    #[serde(default)]
    pub account_owner: bool,

    /// The user's locale preference (e.g., "en").
    #[serde(default)]
    pub locale: String,

    /// Whether the user is a collaborator.
    #[serde(default)]
    pub collaborator: bool,
}

impl AssociatedUser {
    /// Creates a user with only an id set.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

// Verify AssociatedUser is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AssociatedUser>();
};

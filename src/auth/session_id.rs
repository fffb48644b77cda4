//! Session identifier derivation.
//!
//! | Access  | Mode          | Id                   |
//! |---------|---------------|----------------------|
//! | offline | any           | `offline_<shop>`     |
//! | online  | embedded      | `<shop>_<user id>`   |
//! | online  | non-embedded  | random UUID v4       |
//!
//! Embedded online ids are deterministic so any request carrying a session
//! token can recompute them. Non-embedded online ids are random because the
//! id itself travels in the session cookie.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::auth::session_id::{offline_id, online_id, SessionIdMode};
//!
//! assert_eq!(offline_id("my-store").unwrap(), "offline_my-store.myshopify.com");
//! assert_eq!(
//!     online_id("my-store", 42, SessionIdMode::Embedded).unwrap(),
//!     "my-store.myshopify.com_42"
//! );
//! ```

use crate::auth::oauth::OAuthError;
use crate::config::ShopDomain;
use uuid::Uuid;

/// How online session ids are derived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionIdMode {
    /// App runs inside the admin; ids are `<shop>_<user id>`.
    Embedded,
    /// Standalone app; ids are random UUIDs.
    NonEmbedded,
}

impl SessionIdMode {
    /// Returns the mode matching an `is_embedded` config flag.
    #[must_use]
    pub const fn from_embedded(is_embedded: bool) -> Self {
        if is_embedded {
            Self::Embedded
        } else {
            Self::NonEmbedded
        }
    }
}

/// Returns the offline session id for `shop`.
///
/// # Errors
///
/// Returns [`OAuthError::InvalidShop`] if `shop` is not a valid shop domain.
pub fn offline_id(shop: &str) -> Result<String, OAuthError> {
    parse_shop(shop).map(|shop| offline_id_for(&shop))
}

/// Returns the online session id for `user_id` on `shop`.
///
/// # Errors
///
/// Returns [`OAuthError::InvalidShop`] if `shop` is not a valid shop domain.
pub fn online_id(shop: &str, user_id: u64, mode: SessionIdMode) -> Result<String, OAuthError> {
    parse_shop(shop).map(|shop| online_id_for(&shop, user_id, mode))
}

/// Returns the offline session id for an already validated shop.
#[must_use]
pub fn offline_id_for(shop: &ShopDomain) -> String {
    format!("offline_{shop}")
}

/// Returns the online session id for an already validated shop.
#[must_use]
pub fn online_id_for(shop: &ShopDomain, user_id: u64, mode: SessionIdMode) -> String {
    match mode {
        SessionIdMode::Embedded => format!("{shop}_{user_id}"),
        SessionIdMode::NonEmbedded => Uuid::new_v4().to_string(),
    }
}

fn parse_shop(shop: &str) -> Result<ShopDomain, OAuthError> {
    ShopDomain::new(shop).map_err(|_| OAuthError::InvalidShop {
        shop: shop.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_offline_id_normalizes_shop() {
        assert_eq!(
            offline_id("shop1.myshopify.io").unwrap(),
            "offline_shop1.myshopify.io"
        );
        assert_eq!(
            offline_id("https://Shop1.myshopify.com/").unwrap(),
            "offline_shop1.myshopify.com"
        );
    }

    #[test]
    fn test_offline_id_is_deterministic() {
        assert_eq!(offline_id("shop1").unwrap(), offline_id("shop1").unwrap());
    }

    #[test]
    fn test_embedded_online_id_is_deterministic() {
        let first = online_id("shop1.myshopify.io", 999, SessionIdMode::Embedded).unwrap();
        let second = online_id("shop1.myshopify.io", 999, SessionIdMode::Embedded).unwrap();

        assert_eq!(first, "shop1.myshopify.io_999");
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_embedded_online_id_is_random_uuid() {
        let ids: HashSet<String> = (0..1_000)
            .map(|_| online_id("shop1", 999, SessionIdMode::NonEmbedded).unwrap())
            .collect();

        assert_eq!(ids.len(), 1_000);
        for id in &ids {
            let parsed = Uuid::parse_str(id).unwrap();
            assert_eq!(parsed.get_version_num(), 4);
        }
    }

    #[test]
    fn test_invalid_shop_is_rejected() {
        for shop in ["", "not a shop", "evil.com", "-bad-.myshopify.com"] {
            assert!(
                matches!(offline_id(shop), Err(OAuthError::InvalidShop { .. })),
                "expected InvalidShop for {shop:?}"
            );
            assert!(matches!(
                online_id(shop, 1, SessionIdMode::Embedded),
                Err(OAuthError::InvalidShop { .. })
            ));
        }
    }

    #[test]
    fn test_mode_from_embedded_flag() {
        assert_eq!(SessionIdMode::from_embedded(true), SessionIdMode::Embedded);
        assert_eq!(
            SessionIdMode::from_embedded(false),
            SessionIdMode::NonEmbedded
        );
    }
}

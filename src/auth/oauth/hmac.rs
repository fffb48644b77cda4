//! HMAC verification for OAuth callbacks.
//!
//! The platform signs the callback query with HMAC-SHA256 keyed by the app
//! secret and sends the lowercase hex digest as `hmac`. Verification
//! recomputes the digest over [`AuthQuery::to_signable_string`] and compares
//! it in constant time.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::auth::oauth::hmac::{compute_signature, verify_hmac};
//! use shopify_app_auth::auth::oauth::AuthQuery;
//!
//! let signable = "code=abc&shop=shop1.myshopify.io&state=xyz&timestamp=1700000000";
//! let hmac = compute_signature(signable, "secret");
//! let query = AuthQuery::parse(&format!("{signable}&hmac={hmac}")).unwrap();
//!
//! assert!(verify_hmac("secret", &query).unwrap());
//! assert!(!verify_hmac("other-secret", &query).unwrap());
//! ```

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::oauth::{AuthQuery, OAuthError};
use crate::config::ApiSecretKey;

type HmacSha256 = Hmac<Sha256>;

/// Computes the lowercase hex HMAC-SHA256 of `message` keyed by `secret`.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::auth::oauth::hmac::compute_signature;
///
/// let sig = compute_signature("message", "key");
/// assert_eq!(
///     sig,
///     "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a"
/// );
/// ```
#[must_use]
pub fn compute_signature(message: &str, secret: &str) -> String {
    hex::encode(sign(message, secret))
}

/// Computes the unpadded base64url HMAC-SHA256 of `message`.
///
/// Used for signed cookie values, where the digest must be cookie-safe.
#[must_use]
pub fn compute_signature_base64url(message: &str, secret: &str) -> String {
    URL_SAFE_NO_PAD.encode(sign(message, secret))
}

// HMAC accepts keys of any size, so the expect never fires.
fn sign(message: &str, secret: &str) -> impl AsRef<[u8]> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    mac.finalize().into_bytes()
}

/// Compares two strings in constant time with respect to their contents.
///
/// Strings of different lengths compare unequal without inspecting bytes.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Verifies the callback signature with a single secret.
///
/// Returns `Ok(false)` for any mismatch, including a malformed `hmac` value.
///
/// # Errors
///
/// Returns [`OAuthError::MissingRequiredArgument`] if `secret` is empty.
pub fn verify_hmac(secret: &str, query: &AuthQuery) -> Result<bool, OAuthError> {
    if secret.is_empty() {
        return Err(OAuthError::missing("api_secret_key"));
    }

    let expected = compute_signature(&query.to_signable_string(), secret);
    Ok(constant_time_compare(&expected, query.hmac()))
}

/// Verifies the callback signature against every configured secret.
///
/// Secrets are tried in order, so pass the primary key first and any
/// rotated-out key after it.
#[must_use]
pub fn validate_hmac<'a, I>(query: &AuthQuery, secrets: I) -> bool
where
    I: IntoIterator<Item = &'a ApiSecretKey>,
{
    // ApiSecretKey is never empty, so verify_hmac cannot fail here.
    secrets
        .into_iter()
        .any(|secret| verify_hmac(secret.as_ref(), query).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::oauth::signable_string;

    const SECRET: &str = "hush";

    // Example callback from the platform's OAuth documentation.
    const DOCUMENTED_SIGNABLE: &str = "code=0907a61c0c8d55e99db179b68161bc00&shop=some-shop.myshopify.com&state=0.6784241404160823&timestamp=1337178173";
    const DOCUMENTED_HMAC: &str =
        "700e2dadb827fcc8609e9d5ce208b2e9cdaab9df07390d2cbca10d7c328fc4bf";
    const SIGNED_PARAMS: [&str; 4] = ["code", "shop", "state", "timestamp"];

    fn documented_query() -> AuthQuery {
        AuthQuery::parse(&format!("{DOCUMENTED_SIGNABLE}&hmac={DOCUMENTED_HMAC}")).unwrap()
    }

    fn signed_query(secret: &str) -> AuthQuery {
        let signable = "code=0907a61c0c8d55e99db179b68161bc00&shop=shop1.myshopify.io&state=nonce123&timestamp=1700000000";
        let hmac = compute_signature(signable, secret);
        AuthQuery::parse(&format!("{signable}&hmac={hmac}")).unwrap()
    }

    fn flip_char(s: &str, index: usize) -> String {
        s.char_indices()
            .map(|(i, c)| {
                if i == index {
                    if c == 'a' {
                        'b'
                    } else {
                        'a'
                    }
                } else {
                    c
                }
            })
            .collect()
    }

    #[test]
    fn test_compute_signature_matches_known_value() {
        assert_eq!(
            compute_signature("message", "key"),
            "6e9ef29b75fffc5b7abae527d58fdadb2fe42e7219011976917343065f58ed4a"
        );
    }

    #[test]
    fn test_compute_signature_base64url_is_cookie_safe() {
        let sig = compute_signature_base64url("message", "key");
        assert_eq!(sig.len(), 43);
        assert!(sig
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_compute_signature_is_lowercase_hex() {
        let sig = compute_signature("", "secret");
        assert_eq!(sig.len(), 64);
        assert!(sig
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_verify_hmac_accepts_known_good_query() {
        assert!(verify_hmac(SECRET, &signed_query(SECRET)).unwrap());
    }

    #[test]
    fn test_verify_hmac_accepts_documented_platform_query() {
        let query = documented_query();

        assert_eq!(query.to_signable_string(), DOCUMENTED_SIGNABLE);
        assert_eq!(compute_signature(DOCUMENTED_SIGNABLE, SECRET), DOCUMENTED_HMAC);
        assert!(verify_hmac(SECRET, &query).unwrap());
    }

    #[test]
    fn test_verify_hmac_rejects_single_character_flip_in_hmac() {
        let query = documented_query();
        for index in 0..DOCUMENTED_HMAC.len() {
            let tampered = AuthQuery::parse(&format!(
                "{DOCUMENTED_SIGNABLE}&hmac={}",
                flip_char(DOCUMENTED_HMAC, index)
            ))
            .unwrap();
            assert!(!verify_hmac(SECRET, &tampered).unwrap(), "hmac[{index}]");
        }
        assert!(verify_hmac(SECRET, &query).unwrap());
    }

    #[test]
    fn test_verify_hmac_rejects_single_character_flip_in_params() {
        let query = documented_query();
        for name in SIGNED_PARAMS {
            let value = query.get(name).unwrap();
            for index in 0..value.len() {
                let flipped = flip_char(value, index);
                let pairs = SIGNED_PARAMS.map(|key| {
                    let value = if key == name {
                        flipped.as_str()
                    } else {
                        query.get(key).unwrap()
                    };
                    (key, value)
                });
                let tampered = AuthQuery::parse(&format!(
                    "{}&hmac={DOCUMENTED_HMAC}",
                    signable_string(pairs)
                ))
                .unwrap();

                assert!(!verify_hmac(SECRET, &tampered).unwrap(), "{name}[{index}]");
            }
        }
    }

    #[test]
    fn test_verify_hmac_rejects_empty_secret() {
        let result = verify_hmac("", &signed_query(SECRET));
        assert!(matches!(
            result,
            Err(OAuthError::MissingRequiredArgument { .. })
        ));
    }

    #[test]
    fn test_verify_hmac_ignores_signature_param() {
        let query = signed_query(SECRET);
        let with_signature = AuthQuery::parse(&format!(
            "{}&signature=legacy&hmac={}",
            query.to_signable_string(),
            query.hmac()
        ))
        .unwrap();

        assert!(verify_hmac(SECRET, &with_signature).unwrap());
    }

    #[test]
    fn test_validate_hmac_falls_back_to_old_secret() {
        let primary = ApiSecretKey::new("new-secret").unwrap();
        let old = ApiSecretKey::new("old-secret").unwrap();
        let query = signed_query("old-secret");

        assert!(validate_hmac(&query, [&primary, &old]));
        assert!(!validate_hmac(&query, [&primary]));
    }
}

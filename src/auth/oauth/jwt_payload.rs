//! Session token (JWT) decoding for embedded apps.
//!
//! Embedded apps receive a short-lived HS256 session token from the admin on
//! every request, in `Authorization: Bearer <token>`. The token is signed
//! with the app secret and names the shop (`dest`) and staff member (`sub`),
//! which is all [`current_session_id`](crate::OAuthFlow::current_session_id)
//! needs to recompute a deterministic session id.
//!
//! Decoding tries the primary secret first and then the old secret, with
//! 10 seconds of leeway on `exp`/`nbf`.

use crate::auth::oauth::OAuthError;
use crate::config::{ShopDomain, ShopifyConfig};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Leeway for time-based claims, in seconds.
const JWT_LEEWAY_SECS: u64 = 10;

/// Claims of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtPayload {
    /// Issuer, e.g. `https://shop.myshopify.com/admin`.
    pub iss: String,
    /// Destination shop, e.g. `https://shop.myshopify.com`.
    pub dest: String,
    /// Audience; must equal the app's API key.
    pub aud: String,
    /// Staff member id.
    pub sub: Option<String>,
    /// Expiry (Unix seconds).
    pub exp: i64,
    /// Not before (Unix seconds).
    pub nbf: i64,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Token id.
    pub jti: String,
    /// Admin session id.
    pub sid: Option<String>,
}

impl JwtPayload {
    /// Decodes and validates a session token.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidJwt`] if no configured secret verifies
    /// the signature, a time claim is out of range, or `aud` is not the API
    /// key.
    pub fn decode(token: &str, config: &ShopifyConfig) -> Result<Self, OAuthError> {
        let mut last_error = None;
        let mut payload = None;

        for secret in config.secret_keys() {
            match Self::decode_with_key(token, secret.as_ref()) {
                Ok(claims) => {
                    payload = Some(claims);
                    break;
                }
                Err(e) => {
                    // Keep the primary key's error; it is the meaningful one.
                    last_error.get_or_insert(e);
                }
            }
        }

        let payload = payload.ok_or_else(|| OAuthError::InvalidJwt {
            reason: last_error.map_or_else(
                || "no secret configured".to_string(),
                |e| format!("Error decoding session token: {e}"),
            ),
        })?;

        if payload.aud != config.api_key().as_ref() {
            return Err(OAuthError::InvalidJwt {
                reason: "Session token had invalid API key".to_string(),
            });
        }

        Ok(payload)
    }

    fn decode_with_key(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = JWT_LEEWAY_SECS;
        // aud is compared by hand so the error names the API key
        validation.validate_aud = false;
        validation.validate_nbf = true;

        let key = DecodingKey::from_secret(secret.as_bytes());
        Ok(decode::<Self>(token, &key, &validation)?.claims)
    }

    /// Returns the shop named by `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::InvalidJwt`] if `dest` is not a shop URL.
    pub fn shop(&self) -> Result<ShopDomain, OAuthError> {
        ShopDomain::new(self.dest.as_str()).map_err(|_| OAuthError::InvalidJwt {
            reason: format!("Session token has invalid destination '{}'", self.dest),
        })
    }

    /// Returns the staff member id when `sub` is numeric.
    #[must_use]
    pub fn user_id(&self) -> Option<u64> {
        self.sub
            .as_deref()
            .filter(|sub| !sub.is_empty() && sub.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|sub| sub.parse().ok())
    }
}

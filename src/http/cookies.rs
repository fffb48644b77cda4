//! Signed cookies.
//!
//! The OAuth flow keeps no server-side state; the only thing correlating
//! `begin` with `callback` is a cookie the browser carries. Cookie values are
//! therefore signed with the app secret so a client can neither forge nor
//! alter them.
//!
//! # Wire Format
//!
//! ```text
//! v1.<expires>.<value>.<mac>
//! ```
//!
//! - `expires`: Unix seconds after which the value is rejected, or `0`
//! - `value`: the percent-encoded plaintext value
//! - `mac`: unpadded base64url HMAC-SHA256 of `<name>=v1.<expires>.<value>`
//!
//! Binding the cookie name into the MAC stops a value signed for one cookie
//! being replayed under another name. The embedded expiry is checked here,
//! independent of whatever `Max-Age` the browser honoured.
//!
//! # Example
//!
//! ```rust
//! use shopify_app_auth::http::{CookieKeys, CookieOptions, SignedCookieJar};
//! use shopify_app_auth::ApiSecretKey;
//!
//! let keys = CookieKeys::new(vec![ApiSecretKey::new("secret").unwrap()]).unwrap();
//!
//! let mut outgoing = SignedCookieJar::from_request(&keys, None);
//! outgoing.set_signed("flavor", "oatmeal", &CookieOptions::default());
//! let set_cookie = outgoing.headers().set_cookies().next().unwrap().to_string();
//!
//! // The browser sends the cookie back on the next request.
//! let pair = set_cookie.split(';').next().unwrap();
//! let incoming = SignedCookieJar::from_request(&keys, Some(pair));
//! assert_eq!(incoming.get_verified("flavor").as_deref(), Some("oatmeal"));
//! ```

use crate::auth::oauth::hmac::{compute_signature_base64url, constant_time_compare};
use crate::config::{ApiSecretKey, ShopifyConfig};
use crate::error::ConfigError;
use crate::http::ResponseHeaders;
use chrono::{DateTime, Utc};
use cookie::time::{Duration as CookieDuration, OffsetDateTime};
use cookie::Cookie;
use std::borrow::Cow;

pub use cookie::SameSite;

/// Version tag prefixed to every signed value.
const FORMAT_VERSION: &str = "v1";

/// Secrets used to sign and verify cookies.
///
/// The first key signs; every key verifies, so a rotated-out secret keeps
/// in-flight cookies valid.
#[derive(Clone, Debug)]
pub struct CookieKeys {
    keys: Vec<ApiSecretKey>,
}

impl CookieKeys {
    /// Creates a key list; index 0 is the signing key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCookieKeys`] if `keys` is empty.
    pub fn new(keys: Vec<ApiSecretKey>) -> Result<Self, ConfigError> {
        if keys.is_empty() {
            return Err(ConfigError::EmptyCookieKeys);
        }
        Ok(Self { keys })
    }

    /// Uses the API secret key to sign and the old secret (if any) to verify.
    #[must_use]
    pub fn from_config(config: &ShopifyConfig) -> Self {
        Self {
            keys: config.secret_keys().cloned().collect(),
        }
    }

    fn signing_key(&self) -> &ApiSecretKey {
        // Non-empty by construction.
        &self.keys[0]
    }
}

/// Attributes for a signed cookie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CookieOptions {
    /// Absolute expiry. `None` makes a browser-session cookie that never
    /// expires server side.
    pub expires: Option<DateTime<Utc>>,
    /// `SameSite` attribute.
    pub same_site: SameSite,
    /// `Secure` attribute.
    pub secure: bool,
    /// `HttpOnly` attribute.
    pub http_only: bool,
    /// `Path` attribute.
    pub path: String,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            expires: None,
            same_site: SameSite::Lax,
            secure: true,
            http_only: true,
            path: "/".to_string(),
        }
    }
}

/// Reads signed cookies from a request and collects `Set-Cookie` headers
/// for the response.
#[derive(Debug)]
pub struct SignedCookieJar<'k> {
    keys: &'k CookieKeys,
    incoming: Vec<(String, String)>,
    outgoing: ResponseHeaders,
}

impl<'k> SignedCookieJar<'k> {
    /// Parses the request's `Cookie` header.
    ///
    /// Malformed pairs are skipped.
    #[must_use]
    pub fn from_request(keys: &'k CookieKeys, cookie_header: Option<&str>) -> Self {
        let incoming = cookie_header
            .map(|header| {
                Cookie::split_parse(header)
                    .filter_map(Result::ok)
                    .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            keys,
            incoming,
            outgoing: ResponseHeaders::new(),
        }
    }

    /// Signs `value` and queues a `Set-Cookie` header for it.
    pub fn set_signed(&mut self, name: &str, value: &str, options: &CookieOptions) {
        let signed = self.sign(name, value, options.expires);

        let mut builder = Cookie::build((name.to_string(), signed))
            .path(options.path.clone())
            .same_site(options.same_site)
            .secure(options.secure)
            .http_only(options.http_only);

        if let Some(expires) = options.expires {
            let remaining = (expires - Utc::now()).num_seconds().max(0);
            builder = builder.max_age(CookieDuration::seconds(remaining));
            if let Ok(at) = OffsetDateTime::from_unix_timestamp(expires.timestamp()) {
                builder = builder.expires(at);
            }
        }

        self.outgoing
            .append("Set-Cookie", builder.build().to_string());
    }

    /// Returns the verified value of cookie `name`.
    ///
    /// Returns `None` if the cookie is missing, malformed, signed by an
    /// unknown key, signed for a different name, or expired.
    #[must_use]
    pub fn get_verified(&self, name: &str) -> Option<String> {
        let now = Utc::now().timestamp();
        self.incoming
            .iter()
            .filter(|(candidate, _)| candidate == name)
            .find_map(|(_, raw)| self.verify(name, raw, now))
    }

    /// Queues a `Set-Cookie` header that removes cookie `name` at `path`.
    pub fn delete(&mut self, name: &str, path: &str) {
        let mut removal = Cookie::build((name.to_string(), ""))
            .path(path.to_string())
            .build();
        removal.make_removal();

        self.outgoing.append("Set-Cookie", removal.to_string());
    }

    /// Reads cookie `name` and queues its removal.
    ///
    /// The removal is queued even when verification fails, so a forged or
    /// stale cookie is cleared too.
    pub fn take_verified(&mut self, name: &str, path: &str) -> Option<String> {
        let value = self.get_verified(name);
        self.delete(name, path);
        value
    }

    /// Returns the headers queued so far.
    #[must_use]
    pub const fn headers(&self) -> &ResponseHeaders {
        &self.outgoing
    }

    /// Consumes the jar and returns the queued headers.
    #[must_use]
    pub fn into_headers(self) -> ResponseHeaders {
        self.outgoing
    }

    fn sign(&self, name: &str, value: &str, expires: Option<DateTime<Utc>>) -> String {
        let payload = format!(
            "{FORMAT_VERSION}.{}.{}",
            expires.map_or(0, |at| at.timestamp()),
            urlencoding::encode(value)
        );
        let mac = compute_signature_base64url(
            &format!("{name}={payload}"),
            self.keys.signing_key().as_ref(),
        );
        format!("{payload}.{mac}")
    }

    fn verify(&self, name: &str, raw: &str, now: i64) -> Option<String> {
        let (payload, mac) = raw.rsplit_once('.')?;
        let (expires, encoded) = payload
            .strip_prefix(FORMAT_VERSION)?
            .strip_prefix('.')?
            .split_once('.')?;

        let message = format!("{name}={payload}");
        let authentic = self.keys.keys.iter().any(|key| {
            constant_time_compare(&compute_signature_base64url(&message, key.as_ref()), mac)
        });
        if !authentic {
            return None;
        }

        let expires: i64 = expires.parse().ok()?;
        if expires != 0 && now >= expires {
            return None;
        }

        urlencoding::decode(encoded).ok().map(Cow::into_owned)
    }
}

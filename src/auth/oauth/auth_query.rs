//! Callback query parsing and canonicalization.
//!
//! The platform signs every parameter of the callback except `hmac` (and the
//! legacy `signature`). [`AuthQuery`] keeps all of them so the signature can
//! be recomputed over exactly what was received, including parameters this
//! crate does not otherwise look at, such as `host`.

use crate::auth::oauth::OAuthError;
use std::collections::BTreeMap;
use url::form_urlencoded;

/// Parameters every callback must carry.
const REQUIRED_PARAMS: [&str; 5] = ["shop", "code", "state", "hmac", "timestamp"];

/// Parameters excluded from the signed message.
const UNSIGNED_PARAMS: [&str; 2] = ["hmac", "signature"];

/// The decoded query string of an OAuth callback.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::auth::oauth::AuthQuery;
///
/// let query = AuthQuery::parse(
///     "code=abc&hmac=deadbeef&shop=shop1.myshopify.io&state=xyz&timestamp=1700000000",
/// )
/// .unwrap();
///
/// assert_eq!(query.shop(), "shop1.myshopify.io");
/// assert_eq!(
///     query.to_signable_string(),
///     "code=abc&shop=shop1.myshopify.io&state=xyz&timestamp=1700000000"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthQuery {
    params: Vec<(String, String)>,
}

impl AuthQuery {
    /// Parses a raw (still percent-encoded) query string.
    ///
    /// A leading `?` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::MissingRequiredArgument`] naming the first of
    /// `shop`, `code`, `state`, `hmac`, `timestamp` that is absent or empty.
    pub fn parse(query: &str) -> Result<Self, OAuthError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let params: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
        let parsed = Self { params };

        if let Some(missing) = REQUIRED_PARAMS
            .iter()
            .find(|name| parsed.get(name).map_or(true, str::is_empty))
        {
            return Err(OAuthError::missing(missing));
        }

        Ok(parsed)
    }

    /// Parses the query component of a request URL.
    ///
    /// Accepts absolute URLs and origin-form targets such as
    /// `/auth/callback?code=...`. Any fragment is ignored.
    ///
    /// # Errors
    ///
    /// Same as [`AuthQuery::parse`].
    pub fn from_url(url: &str) -> Result<Self, OAuthError> {
        let without_fragment = url.split_once('#').map_or(url, |(before, _)| before);
        let query = without_fragment
            .split_once('?')
            .map_or("", |(_, query)| query);
        Self::parse(query)
    }

    /// Returns the first value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the `shop` parameter.
    #[must_use]
    pub fn shop(&self) -> &str {
        self.required("shop")
    }

    /// Returns the authorization `code`.
    #[must_use]
    pub fn code(&self) -> &str {
        self.required("code")
    }

    /// Returns the `state` echoed back by the platform.
    #[must_use]
    pub fn state(&self) -> &str {
        self.required("state")
    }

    /// Returns the `hmac` signature.
    #[must_use]
    pub fn hmac(&self) -> &str {
        self.required("hmac")
    }

    /// Returns the raw `timestamp` parameter (Unix seconds).
    #[must_use]
    pub fn timestamp(&self) -> &str {
        self.required("timestamp")
    }

    /// Returns the `host` parameter, if present.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.get("host")
    }

    /// Returns the message the platform signed.
    ///
    /// See [`signable_string`] for the canonical form.
    #[must_use]
    pub fn to_signable_string(&self) -> String {
        signable_string(
            self.params
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        )
    }

    // Presence was checked in `parse`.
    fn required(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }
}

/// Builds the canonical signed message from decoded query pairs.
///
/// `hmac` and `signature` are dropped, keys are sorted, and each pair is
/// form-urlencoded and joined with `&`. A key that repeats, or that ends in
/// `[]`, becomes a single entry (without the brackets) whose value is the
/// JSON array of its values, e.g. `ids=["1","2"]` before encoding.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::auth::oauth::signable_string;
///
/// let message = signable_string([("shop", "a"), ("ids[]", "1"), ("ids[]", "2"), ("hmac", "x")]);
/// assert_eq!(message, "ids=%5B%221%22%2C%222%22%5D&shop=a");
/// ```
pub fn signable_string<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut grouped: BTreeMap<&str, (bool, Vec<&str>)> = BTreeMap::new();

    for (key, value) in pairs {
        if UNSIGNED_PARAMS.contains(&key) {
            continue;
        }
        let (name, bracketed) = key
            .strip_suffix("[]")
            .map_or((key, false), |name| (name, true));
        let entry = grouped.entry(name).or_default();
        entry.0 |= bracketed;
        entry.1.push(value);
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, (bracketed, values)) in &grouped {
        if !bracketed && values.len() == 1 {
            serializer.append_pair(name, values[0]);
        } else {
            let array = serde_json::Value::from(values.clone()).to_string();
            serializer.append_pair(name, &array);
        }
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str =
        "code=abc&hmac=deadbeef&shop=shop1.myshopify.io&state=xyz&timestamp=1700000000";

    #[test]
    fn test_parse_reads_required_fields() {
        let query = AuthQuery::parse(VALID).unwrap();

        assert_eq!(query.code(), "abc");
        assert_eq!(query.hmac(), "deadbeef");
        assert_eq!(query.shop(), "shop1.myshopify.io");
        assert_eq!(query.state(), "xyz");
        assert_eq!(query.timestamp(), "1700000000");
        assert!(query.host().is_none());
    }

    #[test]
    fn test_parse_reports_missing_field() {
        for field in REQUIRED_PARAMS {
            let query: String = VALID
                .split('&')
                .filter(|pair| !pair.starts_with(&format!("{field}=")))
                .collect::<Vec<_>>()
                .join("&");

            match AuthQuery::parse(&query) {
                Err(OAuthError::MissingRequiredArgument { argument }) => {
                    assert_eq!(argument, field);
                }
                other => panic!("expected MissingRequiredArgument for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_treats_empty_value_as_missing() {
        let result = AuthQuery::parse(&VALID.replace("code=abc", "code="));
        assert!(matches!(
            result,
            Err(OAuthError::MissingRequiredArgument { argument }) if argument == "code"
        ));
    }

    #[test]
    fn test_from_url_extracts_query() {
        let url = format!("https://app.example.com/auth/callback?{VALID}#fragment");
        let query = AuthQuery::from_url(&url).unwrap();
        assert_eq!(query.timestamp(), "1700000000");

        let origin_form = format!("/auth/callback?{VALID}");
        assert_eq!(AuthQuery::from_url(&origin_form).unwrap(), query);
    }

    #[test]
    fn test_signable_string_sorts_and_drops_signatures() {
        let query =
            AuthQuery::parse(&format!("{VALID}&signature=legacy&host=YWRtaW4")).unwrap();

        assert_eq!(
            query.to_signable_string(),
            "code=abc&host=YWRtaW4&shop=shop1.myshopify.io&state=xyz&timestamp=1700000000"
        );
    }

    #[test]
    fn test_signable_string_reencodes_decoded_values() {
        let message = signable_string([("b", "a b&c"), ("a", "x=y")]);
        assert_eq!(message, "a=x%3Dy&b=a+b%26c");
    }

    #[test]
    fn test_signable_string_collapses_repeated_keys() {
        let message = signable_string([("ids", "1"), ("shop", "s"), ("ids", "2")]);
        assert_eq!(message, "ids=%5B%221%22%2C%222%22%5D&shop=s");
    }

    #[test]
    fn test_signable_string_bracketed_single_value_is_array() {
        let message = signable_string([("ids[]", "1")]);
        assert_eq!(message, "ids=%5B%221%22%5D");
    }
}

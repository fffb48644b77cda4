//! Framework-neutral view of an incoming request.

/// The parts of an incoming HTTP request the OAuth flow reads.
///
/// Implement this for your framework's request type, or build a
/// [`RawRequest`].
pub trait IncomingRequest {
    /// Returns the request target: an absolute URL or an origin-form target
    /// such as `/auth/callback?code=...`.
    fn url(&self) -> &str;

    /// Returns the first value of header `name` (case-insensitive).
    fn header(&self, name: &str) -> Option<&str>;

    /// Returns the path component of [`url`](Self::url).
    fn path(&self) -> &str {
        request_path(self.url())
    }

    /// Returns the `Cookie` header.
    fn cookie_header(&self) -> Option<&str> {
        self.header("cookie")
    }
}

/// An owned request with a URL and a list of headers.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::http::{IncomingRequest, RawRequest};
///
/// let request = RawRequest::new("https://app.example.com/auth/callback?code=1")
///     .with_header("Cookie", "a=b");
///
/// assert_eq!(request.path(), "/auth/callback");
/// assert_eq!(request.cookie_header(), Some("a=b"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawRequest {
    url: String,
    headers: Vec<(String, String)>,
}

impl RawRequest {
    /// Creates a request for `url` with no headers.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl IncomingRequest for RawRequest {
    fn url(&self) -> &str {
        &self.url
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

impl<T: IncomingRequest + ?Sized> IncomingRequest for &T {
    fn url(&self) -> &str {
        (**self).url()
    }

    fn header(&self, name: &str) -> Option<&str> {
        (**self).header(name)
    }
}

/// Extracts the path from an absolute URL or origin-form target.
///
/// Returns `/` when the target has no path.
#[must_use]
pub fn request_path(url: &str) -> &str {
    let without_authority = url.split_once("://").map_or(url, |(_, rest)| {
        rest.find(['/', '?', '#']).map_or("", |index| &rest[index..])
    });
    let path = without_authority
        .find(['?', '#'])
        .map_or(without_authority, |index| &without_authority[..index]);

    if path.is_empty() {
        "/"
    } else {
        path
    }
}

//! The HTTP seam between the OAuth flow and the host web framework.
//!
//! The flow never touches a framework type. It reads requests through
//! [`IncomingRequest`] and returns [`ResponseHeaders`] for the host to copy
//! onto its response; [`SignedCookieJar`] sits in between for the cookies
//! that carry state across the redirect.

pub mod cookies;
mod request;
mod response;

pub use cookies::{CookieKeys, CookieOptions, SameSite, SignedCookieJar};
pub use request::{request_path, IncomingRequest, RawRequest};
pub use response::ResponseHeaders;

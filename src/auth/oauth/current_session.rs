//! Finding the session id for a request after OAuth has completed.
//!
//! Embedded apps recompute the id from the session token the admin attaches
//! to every request. Non-embedded apps read it back from the signed session
//! cookie set by the callback.

use crate::auth::oauth::flow::{OAuthFlow, SESSION_COOKIE_NAME};
use crate::auth::oauth::jwt_payload::JwtPayload;
use crate::auth::oauth::token_exchange::TokenExchanger;
use crate::auth::oauth::OAuthError;
use crate::auth::session_id::{offline_id_for, online_id_for, SessionIdMode};
use crate::http::{IncomingRequest, SignedCookieJar};

impl<E: TokenExchanger> OAuthFlow<E> {
    /// Returns the id of the session the request belongs to.
    ///
    /// For embedded apps `is_online` selects between `<shop>_<user id>` and
    /// `offline_<shop>`. Non-embedded apps ignore it and return the cookie
    /// value, or `None` if there is no valid session cookie.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::MissingRequiredArgument`] if an embedded request has
    ///   no bearer token
    /// - [`OAuthError::InvalidJwt`] if the session token does not verify, or
    ///   an online id is requested from a token without a user
    pub fn current_session_id<R>(
        &self,
        request: &R,
        is_online: bool,
    ) -> Result<Option<String>, OAuthError>
    where
        R: IncomingRequest + ?Sized,
    {
        if !self.config.is_embedded() {
            let jar = SignedCookieJar::from_request(&self.cookie_keys, request.cookie_header());
            return Ok(jar.get_verified(SESSION_COOKIE_NAME));
        }

        let token = request
            .header("authorization")
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| OAuthError::missing("authorization"))?;

        let payload = JwtPayload::decode(token, &self.config)?;
        let shop = payload.shop()?;

        if !is_online {
            return Ok(Some(offline_id_for(&shop)));
        }

        let user_id = payload.user_id().ok_or_else(|| OAuthError::InvalidJwt {
            reason: "Session token does not identify a user".to_string(),
        })?;
        tracing::debug!(shop = %shop, "Resolved online session from session token");

        Ok(Some(online_id_for(&shop, user_id, SessionIdMode::Embedded)))
    }
}

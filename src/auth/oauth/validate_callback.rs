//! Completing the authorization code flow.
//!
//! The callback runs these checks in order and stops at the first failure:
//!
//! 1. the app is not private
//! 2. the signed state cookie is present (it is deleted in the response
//!    either way)
//! 3. the query carries `shop`, `code`, `state`, `hmac`, `timestamp`
//! 4. `shop` is a valid shop domain
//! 5. `hmac` verifies with one of the configured secrets
//! 6. `timestamp` is within 90 seconds of now
//! 7. `state` equals the cookie value (constant time)
//!
//! Only then is the code exchanged for a token. A [`Session`] is built only
//! from a successful exchange, so no failure leaves a partial session.

use crate::auth::oauth::auth_query::AuthQuery;
use crate::auth::oauth::flow::{
    timestamp_tolerance, CallbackResult, FlowState, OAuthFlow, SESSION_COOKIE_NAME,
    STATE_COOKIE_NAME,
};
use crate::auth::oauth::hmac::{constant_time_compare, validate_hmac};
use crate::auth::oauth::token_exchange::{AccessTokenRequest, TokenExchanger};
use crate::auth::oauth::OAuthError;
use crate::auth::session_id::SessionIdMode;
use crate::auth::Session;
use crate::config::ShopDomain;
use crate::http::{CookieOptions, IncomingRequest, SameSite, SignedCookieJar};
use chrono::{DateTime, Utc};

impl<E: TokenExchanger> OAuthFlow<E> {
    /// Completes OAuth from the platform's redirect back to the app.
    ///
    /// Online versus offline is decided by the token response alone: a
    /// response with `associated_user` produces an online session.
    ///
    /// # Errors
    ///
    /// - [`OAuthError::PrivateApp`] for private apps
    /// - [`OAuthError::CookieNotFound`] if the state cookie is missing,
    ///   forged or expired
    /// - [`OAuthError::MissingRequiredArgument`] for an incomplete query
    /// - [`OAuthError::InvalidShop`] for a bad `shop` value
    /// - [`OAuthError::InvalidOAuthCallback`] if the HMAC, timestamp or
    ///   state check fails
    /// - [`OAuthError::TokenExchangeFailed`] if the exchange fails
    pub async fn callback<R>(&self, request: &R) -> Result<CallbackResult, OAuthError>
    where
        R: IncomingRequest + Sync + ?Sized,
    {
        self.ensure_not_private()?;

        let mut jar = SignedCookieJar::from_request(&self.cookie_keys, request.cookie_header());
        let Some(expected_state) = jar.take_verified(STATE_COOKIE_NAME, request.path()) else {
            tracing::warn!(flow_state = %FlowState::Failed, "OAuth state cookie missing or invalid");
            return Err(OAuthError::CookieNotFound {
                name: STATE_COOKIE_NAME.to_string(),
            });
        };

        let query = AuthQuery::from_url(request.url())?;
        let shop = ShopDomain::new(query.shop()).map_err(|_| OAuthError::InvalidShop {
            shop: query.shop().to_string(),
        })?;

        if let Err(error) = self.verify_callback(&query, &expected_state, Utc::now()) {
            tracing::warn!(
                shop = %shop,
                flow_state = %FlowState::Failed,
                error = %error,
                "Rejected OAuth callback"
            );
            return Err(error);
        }

        let token_request = AccessTokenRequest::new(&self.config, query.code());
        let response = self.exchanger.exchange_code(&shop, &token_request).await?;

        let session = Session::from_access_token_response(
            shop,
            query.state(),
            response,
            SessionIdMode::from_embedded(self.config.is_embedded()),
            Utc::now(),
        )?;

        if !self.config.is_embedded() {
            jar.set_signed(
                SESSION_COOKIE_NAME,
                session.id(),
                &CookieOptions {
                    expires: session.expires(),
                    same_site: SameSite::Lax,
                    secure: true,
                    http_only: true,
                    path: "/".to_string(),
                },
            );
        }

        tracing::info!(
            shop = %session.shop(),
            is_online = session.is_online(),
            flow_state = %FlowState::Completed,
            "Completed OAuth callback"
        );

        Ok(CallbackResult {
            session,
            headers: jar.into_headers(),
        })
    }

    /// Completes OAuth, ignoring the caller's `is_online` flag.
    ///
    /// Whether the session is online is decided by the token response, so
    /// the flag can only disagree with reality. It is accepted for callers
    /// migrating from older signatures and logged as deprecated.
    ///
    /// # Errors
    ///
    /// Same as [`callback`](Self::callback).
    #[deprecated(note = "the token response decides online access; use `callback`")]
    pub async fn callback_with_is_online<R>(
        &self,
        request: &R,
        is_online: bool,
    ) -> Result<CallbackResult, OAuthError>
    where
        R: IncomingRequest + Sync + ?Sized,
    {
        tracing::warn!(
            is_online,
            "The is_online argument to the OAuth callback is deprecated and ignored"
        );
        self.callback(request).await
    }

    fn verify_callback(
        &self,
        query: &AuthQuery,
        expected_state: &str,
        now: DateTime<Utc>,
    ) -> Result<(), OAuthError> {
        if !validate_hmac(query, self.config.secret_keys()) {
            return Err(OAuthError::invalid_callback(
                "Request signature could not be verified",
            ));
        }

        let timestamp: i64 = query
            .timestamp()
            .parse()
            .map_err(|_| OAuthError::invalid_callback("Request timestamp is not a number"))?;
        let tolerance = timestamp_tolerance().num_seconds().unsigned_abs();
        let within_window = now
            .timestamp()
            .checked_sub(timestamp)
            .map(i64::unsigned_abs)
            .is_some_and(|skew| skew <= tolerance);
        if !within_window {
            return Err(OAuthError::invalid_callback(
                "Request timestamp is outside the allowed window",
            ));
        }

        if !constant_time_compare(query.state(), expected_state) {
            return Err(OAuthError::invalid_callback(
                "OAuth state does not match the state cookie",
            ));
        }

        Ok(())
    }
}

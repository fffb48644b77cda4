//! Sessions produced by the OAuth callback.
//!
//! A [`Session`] is either offline (shop-scoped, no expiry) or online
//! (user-scoped, expiring, with [`OnlineAccessInfo`]). The two shapes are
//! only reachable through [`Session::offline`], [`Session::online`] and
//! [`Session::from_access_token_response`], so `is_online`, `expires` and
//! `online_access_info` always agree. Deserialization re-checks the same
//! rule before handing a stored session back.

use crate::auth::oauth::OAuthError;
use crate::auth::session_id::{self, SessionIdMode};
use crate::auth::{AssociatedUser, AuthScopes};
use crate::config::ShopDomain;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Body returned by the platform's `/admin/oauth/access_token` endpoint.
///
/// Online responses carry `expires_in`, `associated_user_scope` and
/// `associated_user`; offline responses carry only `access_token` and
/// `scope`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    /// The access token.
    pub access_token: String,
    /// Comma-separated granted scopes.
    pub scope: String,
    /// Seconds until an online token expires.
    pub expires_in: Option<i64>,
    /// Scopes granted to the associated user.
    pub associated_user_scope: Option<String>,
    /// The staff member for an online token.
    pub associated_user: Option<AssociatedUser>,
}

impl AccessTokenResponse {
    /// Returns `true` when the response describes an online token.
    ///
    /// The `associated_user` field is the only discriminator.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.associated_user.is_some()
    }
}

/// User-level details attached to an online session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineAccessInfo {
    /// Lifetime of the token in seconds, as reported by the platform.
    pub expires_in: i64,
    /// Scopes granted to the associated user.
    pub associated_user_scope: AuthScopes,
    /// The staff member who authorized the app.
    pub associated_user: AssociatedUser,
}

/// An authenticated session for one shop.
///
/// # Example
///
/// ```rust
/// use shopify_app_auth::{Session, ShopDomain};
///
/// let shop = ShopDomain::new("my-store").unwrap();
/// let session = Session::offline(
///     "offline_my-store.myshopify.com",
///     shop,
///     "state-nonce",
///     "access-token",
///     "read_products".parse().unwrap(),
/// );
///
/// assert!(!session.is_online());
/// assert!(session.expires().is_none());
/// assert!(session.is_active(&"read_products".parse().unwrap()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord", into = "SessionRecord")]
pub struct Session {
    id: String,
    shop: ShopDomain,
    state: String,
    access_token: Option<String>,
    scope: Option<AuthScopes>,
    expires: Option<DateTime<Utc>>,
    online_access_info: Option<OnlineAccessInfo>,
}

impl Session {
    /// Window before expiry in which [`is_active`](Self::is_active) already
    /// treats a session as expired.
    const ACTIVE_EXPIRY_MARGIN_MS: i64 = 500;

    /// Creates an offline session.
    #[must_use]
    pub fn offline(
        id: impl Into<String>,
        shop: ShopDomain,
        state: impl Into<String>,
        access_token: impl Into<String>,
        scope: AuthScopes,
    ) -> Self {
        Self {
            id: id.into(),
            shop,
            state: state.into(),
            access_token: Some(access_token.into()),
            scope: Some(scope),
            expires: None,
            online_access_info: None,
        }
    }

    /// Creates an online session.
    #[must_use]
    pub fn online(
        id: impl Into<String>,
        shop: ShopDomain,
        state: impl Into<String>,
        access_token: impl Into<String>,
        scope: AuthScopes,
        expires: DateTime<Utc>,
        online_access_info: OnlineAccessInfo,
    ) -> Self {
        Self {
            id: id.into(),
            shop,
            state: state.into(),
            access_token: Some(access_token.into()),
            scope: Some(scope),
            expires: Some(expires),
            online_access_info: Some(online_access_info),
        }
    }

    /// Builds a session from a token endpoint response.
    ///
    /// The response is online exactly when it carries `associated_user`.
    /// Online ids follow `mode`; offline ids are always `offline_<shop>`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::TokenExchangeFailed`] when the response is
    /// malformed: unparsable scopes, or an online response whose `expires_in`
    /// is missing, not positive or out of range.
    pub fn from_access_token_response(
        shop: ShopDomain,
        state: &str,
        response: AccessTokenResponse,
        mode: SessionIdMode,
        now: DateTime<Utc>,
    ) -> Result<Self, OAuthError> {
        let scope: AuthScopes = response
            .scope
            .parse()
            .map_err(|e| malformed_response(&format!("invalid scope: {e}")))?;

        let Some(associated_user) = response.associated_user else {
            let id = session_id::offline_id_for(&shop);
            return Ok(Self::offline(id, shop, state, response.access_token, scope));
        };

        let expires_in = response
            .expires_in
            .ok_or_else(|| malformed_response("online token without expires_in"))?;
        if expires_in <= 0 {
            return Err(malformed_response("expires_in must be positive"));
        }
        let expires = Duration::try_seconds(expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| malformed_response("expires_in out of range"))?;
        let associated_user_scope: AuthScopes = response
            .associated_user_scope
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e| malformed_response(&format!("invalid associated_user_scope: {e}")))?;

        let id = session_id::online_id_for(&shop, associated_user.id, mode);
        Ok(Self::online(
            id,
            shop,
            state,
            response.access_token,
            scope,
            expires,
            OnlineAccessInfo {
                expires_in,
                associated_user_scope,
                associated_user,
            },
        ))
    }

    /// Returns the session id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the shop the session belongs to.
    #[must_use]
    pub const fn shop(&self) -> &ShopDomain {
        &self.shop
    }

    /// Returns the OAuth state the session was created from.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns `true` for online (user-scoped) sessions.
    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.online_access_info.is_some()
    }

    /// Returns the access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the granted scopes, if known.
    #[must_use]
    pub const fn scope(&self) -> Option<&AuthScopes> {
        self.scope.as_ref()
    }

    /// Returns the expiry of an online session.
    #[must_use]
    pub const fn expires(&self) -> Option<DateTime<Utc>> {
        self.expires
    }

    /// Returns the online access details.
    #[must_use]
    pub const fn online_access_info(&self) -> Option<&OnlineAccessInfo> {
        self.online_access_info.as_ref()
    }

    /// Returns `true` if this session has expired.
    ///
    /// Sessions without an expiration time are never expired.
    #[must_use]
    pub fn expired(&self) -> bool {
        self.is_expired_within(Duration::zero())
    }

    /// Returns `true` if the session expires within `window` from now.
    #[must_use]
    pub fn is_expired_within(&self, window: Duration) -> bool {
        self.expires
            .is_some_and(|expires| expires - window < Utc::now())
    }

    /// Returns `true` if the granted scopes differ from `scopes`.
    #[must_use]
    pub fn is_scope_changed(&self, scopes: &AuthScopes) -> bool {
        self.scope.as_ref() != Some(scopes)
    }

    /// Returns `true` if the session can be used for requests needing `scopes`.
    ///
    /// An active session has a non-empty token, unchanged scopes and does not
    /// expire within the next half second.
    #[must_use]
    pub fn is_active(&self, scopes: &AuthScopes) -> bool {
        !self.is_scope_changed(scopes)
            && self.access_token.as_deref().is_some_and(|t| !t.is_empty())
            && !self.is_expired_within(Duration::milliseconds(Self::ACTIVE_EXPIRY_MARGIN_MS))
    }
}

fn malformed_response(reason: &str) -> OAuthError {
    OAuthError::TokenExchangeFailed {
        status: 200,
        message: format!("Malformed access token response: {reason}"),
    }
}

// Verify Session is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
};

/// Persisted shape of a [`Session`].
#[derive(Serialize, Deserialize)]
struct SessionRecord {
    id: String,
    shop: ShopDomain,
    state: String,
    is_online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<AuthScopes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    online_access_info: Option<OnlineAccessInfo>,
}

impl TryFrom<SessionRecord> for Session {
    type Error = String;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let has_info = record.online_access_info.is_some();
        let has_expiry = record.expires.is_some();
        if record.is_online != has_info || record.is_online != has_expiry {
            return Err(format!(
                "inconsistent session '{}': is_online={}, online_access_info={has_info}, expires={has_expiry}",
                record.id, record.is_online
            ));
        }

        Ok(Self {
            id: record.id,
            shop: record.shop,
            state: record.state,
            access_token: record.access_token,
            scope: record.scope,
            expires: record.expires,
            online_access_info: record.online_access_info,
        })
    }
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        Self {
            is_online: session.is_online(),
            id: session.id,
            shop: session.shop,
            state: session.state,
            access_token: session.access_token,
            scope: session.scope,
            expires: session.expires,
            online_access_info: session.online_access_info,
        }
    }
}

//! Two-tier identity resolution: a cheap cached check first, the identity provider second.

use axum::http::HeaderMap;
use axum_extra::{
    extract::{CookieJar, PrivateCookieJar},
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};
use time::OffsetDateTime;

use crate::{
    Error,
    identity::{UserId, cookie::get_token_from_cookies, token::Token},
};

/// The name of the cookie in which the identity provider's front-end stores the session token.
pub(crate) const SESSION_COOKIE: &str = "__session";

/// Everything a request carries that can identify the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Credentials {
    /// The identity cached in the encrypted identity cookie, if any.
    pub token: Option<Token>,
    /// The identity provider's session token, if any.
    pub session_token: Option<String>,
}

impl Credentials {
    /// Collect the credentials from the request headers.
    ///
    /// The session token is read from an `Authorization: Bearer` header first, then from the
    /// session cookie. `jar` must have been built from the same headers.
    pub fn from_request(jar: &PrivateCookieJar, headers: &HeaderMap) -> Self {
        let token = get_token_from_cookies(jar).ok();

        let session_token = headers
            .typed_get::<Authorization<Bearer>>()
            .map(|authorization| authorization.token().to_owned())
            .or_else(|| {
                CookieJar::from_headers(headers)
                    .get(SESSION_COOKIE)
                    .map(|cookie| cookie.value_trimmed().to_owned())
            })
            .filter(|session_token| !session_token.is_empty());

        Self {
            token,
            session_token,
        }
    }
}

/// A source of caller identities.
///
/// Implementors provide the authoritative check. The fast check defaults to reading the
/// identity cookie and may be overridden.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// A fast, possibly stale identity check that does not leave the process.
    ///
    /// May return `None` for a user who has just signed in, because their identity has not
    /// been cached yet.
    async fn fast_identity(&self, credentials: &Credentials) -> Option<UserId> {
        credentials
            .token
            .as_ref()
            .filter(|token| token.is_valid_at(OffsetDateTime::now_utc()))
            .map(|token| token.user_id.clone())
    }

    /// A slow identity check against the identity provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider could not be asked, e.g. during an outage.
    async fn authoritative_identity(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<UserId>, Error>;
}

/// Resolve the caller's identity, trying the fast check before the authoritative one.
///
/// Returns `None` if neither check identifies the caller. Errors from the authoritative check
/// are logged and treated as "no identity".
pub async fn resolve_identity(
    provider: &dyn IdentityProvider,
    credentials: &Credentials,
) -> Option<UserId> {
    if let Some(user_id) = provider.fast_identity(credentials).await {
        return Some(user_id);
    }

    tracing::debug!("Fast identity check found no user, asking the identity provider.");

    match provider.authoritative_identity(credentials).await {
        Ok(Some(user_id)) => {
            tracing::debug!("Identity provider resolved user {user_id}.");
            Some(user_id)
        }
        Ok(None) => {
            tracing::debug!("Identity provider found no user either.");
            None
        }
        Err(error) => {
            tracing::error!("Error asking the identity provider for the current user: {error}");
            None
        }
    }
}

//! Functions for caching a resolved identity in an encrypted cookie.

use std::cmp::max;

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    identity::{UserId, token::Token},
};

/// The name of the cookie that holds the identity [Token].
pub(crate) const COOKIE_TOKEN: &str = "identity";
/// The default duration for which identity cookies are valid.
pub const DEFAULT_COOKIE_DURATION: Duration = Duration::minutes(5);

/// Add an identity cookie for `user_id` to the cookie jar.
///
/// The cookie and the token inside it expire `duration` from now.
///
/// # Errors
///
/// Returns an [Error::JSONSerializationError] if the token cannot be serialized.
#[cfg(test)]
pub(crate) fn set_identity_cookie(
    jar: PrivateCookieJar,
    user_id: UserId,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let expires_at = OffsetDateTime::now_utc() + duration;

    set_identity_cookie_with_expiry(jar, user_id, expires_at)
}

fn set_identity_cookie_with_expiry(
    jar: PrivateCookieJar,
    user_id: UserId,
    expires_at: OffsetDateTime,
) -> Result<PrivateCookieJar, Error> {
    let token = Token {
        user_id,
        expires_at,
    };
    let token_string = serde_json::to_string(&token)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;

    Ok(jar.add(
        Cookie::build((COOKIE_TOKEN, token_string))
            .expires(expires_at)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    ))
}

/// Set the identity cookie to an invalid value and set its max age to zero, which should delete
/// the cookie on the client side.
pub(crate) fn invalidate_identity_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_TOKEN, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Get the identity token from the cookie jar.
///
/// The token is returned even if it has expired, use [Token::is_valid_at] to check it.
///
/// # Errors
///
/// Returns:
/// - [Error::CookieMissing] if there is no identity cookie,
/// - [Error::InvalidToken] if the cookie does not hold a token.
pub(crate) fn get_token_from_cookies(jar: &PrivateCookieJar) -> Result<Token, Error> {
    let cookie = jar.get(COOKIE_TOKEN).ok_or(Error::CookieMissing)?;

    serde_json::from_str(cookie.value_trimmed())
        .map_err(|error| Error::InvalidToken(error.to_string()))
}

/// Make sure the identity cookie in `jar` names `user_id` and expires no sooner than `duration`
/// from now.
///
/// An existing, valid cookie for the same user keeps its later expiry. A missing cookie, an
/// expired cookie, or a cookie for another user is replaced.
///
/// # Errors
///
/// The cookie jar is not modified if an error is returned.
///
/// Returns an [Error::InvalidTimestamp] if the new expiry would overflow, or an
/// [Error::JSONSerializationError] if the token cannot be serialized.
pub(crate) fn extend_identity_cookie(
    jar: PrivateCookieJar,
    user_id: UserId,
    duration: Duration,
) -> Result<PrivateCookieJar, Error> {
    let now = OffsetDateTime::now_utc();
    let new_expiry = now.checked_add(duration).ok_or_else(|| {
        Error::InvalidTimestamp(format!("{now} + {duration} overflows the date time"))
    })?;

    let expiry = match get_token_from_cookies(&jar) {
        Ok(token) if token.user_id == user_id && token.is_valid_at(now) => {
            max(token.expires_at, new_expiry)
        }
        _ => new_expiry,
    };

    set_identity_cookie_with_expiry(jar, user_id, expiry)
}

//! Log-out route handler that clears the cached identity.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;

use crate::identity::cookie::invalidate_identity_cookie;

/// Invalidate the identity cookie.
///
/// The identity provider's own session is left alone, signing out there is up to the client.
pub async fn get_log_out(jar: PrivateCookieJar) -> Response {
    let jar = invalidate_identity_cookie(jar);

    (jar, StatusCode::NO_CONTENT).into_response()
}

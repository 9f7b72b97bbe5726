//! Middleware for logging requests and responses.

use axum::{
    BoxError,
    body::{Body, Bytes},
    extract::Request,
    http::{
        HeaderMap, HeaderValue,
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};

use crate::api_result::{ApiError, ApiResult};

/// How many bytes of a body are logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest request body accepted, the same as axum's default body limit.
pub const MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Headers that carry credentials and are never logged.
const REDACTED_HEADERS: [axum::http::HeaderName; 3] = [AUTHORIZATION, COOKIE, SET_COOKIE];

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is
/// truncated and logged in full at the `debug` level.
/// Credential headers are redacted.
///
/// Request bodies over [MAX_REQUEST_BODY_SIZE] bytes are refused with 413 before they reach a
/// handler.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = match read_request_body(body).await {
        Ok(body) => body,
        Err(error) if error.is::<LengthLimitError>() => {
            tracing::warn!("Refusing request to {}: {error}", parts.uri);
            return ApiResult::<()>::Error(ApiError::BodyTooLarge).into_response();
        }
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return axum::http::StatusCode::BAD_REQUEST.into_response();
        }
    };

    log_message(
        "Received request",
        &format!("{} {}", parts.method, parts.uri),
        &parts.headers,
        &body,
    );

    let response = next.run(Request::from_parts(parts, Body::from(body))).await;

    let (parts, body) = response.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_message(
        "Sending response",
        &parts.status.to_string(),
        &parts.headers,
        &body,
    );

    Response::from_parts(parts, Body::from(body))
}

async fn read_request_body(body: Body) -> Result<Bytes, BoxError> {
    let body = Limited::new(body, MAX_REQUEST_BODY_SIZE).collect().await?;

    Ok(body.to_bytes())
}

fn log_message(label: &str, summary: &str, headers: &HeaderMap, body: &Bytes) {
    let headers = redact_headers(headers);
    let body_text = String::from_utf8_lossy(body);

    if body_text.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{label}: {summary}\nheaders: {headers:#?}\nbody: {}...",
            truncate(&body_text, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full body: {body_text:?}");
    } else {
        tracing::info!("{label}: {summary}\nheaders: {headers:#?}\nbody: {body_text:?}");
    }
}

fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();

    for name in REDACTED_HEADERS {
        if headers.contains_key(&name) {
            headers.insert(name, HeaderValue::from_static("********"));
        }
    }

    headers
}

/// The longest prefix of `text` that fits in `limit` bytes without splitting a character.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

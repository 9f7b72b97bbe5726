//! The tagged result every JSON handler replies with.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::FormRejection;
use serde::{Serialize, Serializer};

use crate::record::ValidationError;

/// The error messages shown to clients.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The submitted fields were rejected, the message names the first offending field.
    #[error("{0}")]
    Validation(ValidationError),

    /// The caller could not be identified.
    #[error("User not found")]
    UserNotFound,

    /// The caller of a write could not be identified. Refreshing the page usually renews the
    /// provider session.
    #[error("User not found. Please try refreshing the page.")]
    UserNotFoundOnWrite,

    /// The request body could not be read as the expected form.
    #[error("{message}")]
    InvalidRequest {
        /// The status code the extractor chose, e.g. 415 for the wrong content type.
        status: StatusCode,
        /// What was wrong with the body.
        message: String,
    },

    /// The request body was over [MAX_REQUEST_BODY_SIZE](crate::MAX_REQUEST_BODY_SIZE).
    #[error("Request body is too large")]
    BodyTooLarge,

    /// A query for reading data failed.
    #[error("Database error")]
    Database,

    /// A new expense record could not be stored.
    #[error("An unexpected error occurred while adding the expense record.")]
    RecordNotSaved,

    /// No route matches the request.
    #[error("Not found")]
    NotFound,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound | ApiError::UserNotFoundOnWrite => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequest { status, .. } => *status,
            ApiError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Database | ApiError::RecordNotSaved => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::Validation(error)
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Either the data a handler produced or the reason it could not, serialized as
/// `{"data": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiResult<T> {
    /// The handler succeeded.
    Data(T),
    /// The handler failed.
    Error(ApiError),
}

impl<T> From<Result<T, ApiError>> for ApiResult<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => ApiResult::Data(data),
            Err(error) => ApiResult::Error(error),
        }
    }
}

impl<T> IntoResponse for ApiResult<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        let status_code = match &self {
            ApiResult::Data(_) => StatusCode::OK,
            ApiResult::Error(error) => error.status_code(),
        };

        (status_code, Json(self)).into_response()
    }
}

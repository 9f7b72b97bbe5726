//! Expense Tracker is a web service for recording personal expenses.
//!
//! Signed-in users submit expense records (a description, an amount, a category and a date),
//! and the service reports aggregates over them: the running total, the number of days with
//! spending, and the best and worst single expense. A category can be suggested for a
//! description by an external AI categorization service.
//!
//! This library provides a JSON API whose handlers accept URL-encoded form bodies.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod api_result;
mod app_state;
mod category;
mod database_id;
mod db;
mod endpoints;
mod identity;
mod invalidation;
mod logging;
mod not_found;
mod record;
mod routing;
mod summary;

#[cfg(test)]
mod test_utils;

pub use api_result::{ApiError, ApiResult};
pub use app_state::{AppState, create_cookie_key};
pub use category::{
    CATEGORIES, Categorizer, CategorySuggestion, DEFAULT_CATEGORIZER_MODEL, DEFAULT_CATEGORY,
    HttpCategorizer, suggest_category,
};
pub use database_id::RecordId;
pub use db::initialize as initialize_db;
pub use identity::{
    Credentials, CurrentUser, DEFAULT_COOKIE_DURATION, HttpIdentityProvider, IdentityProvider,
    Token, UserId, resolve_identity,
};
pub use invalidation::{Invalidation, ViewInvalidation};
pub use logging::{LOG_BODY_LENGTH_LIMIT, MAX_REQUEST_BODY_SIZE, logging_middleware};
pub use record::{
    AmountInput, AmountRange, ExpenseRecord, NewRecord, RecordData, RecordForm, ValidationError,
    count_active_days, count_records, create_record, get_amount_range, get_total_amount,
    validate_record,
};
pub use routing::build_router;
pub use summary::{BestWorstExpense, SpendingTotal};

/// How long the HTTP clients for external collaborators wait for a response.
pub const COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(10);

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur inside the application.
///
/// None of these are shown to clients directly. Request handlers log them and reply with an
/// [ApiError] instead.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The identity cookie is missing from the cookie jar in the request.
    #[error("no identity cookie in the cookie jar")]
    CookieMissing,

    /// The identity cookie could not be decoded into a token.
    #[error("could not decode the identity token: {0}")]
    InvalidToken(String),

    /// An error occurred while serializing a struct as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// A timestamp could not be formatted for storage, or a stored timestamp could not be
    /// parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The requested row was not found.
    ///
    /// Internally, this error occurs when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The blocking task running a database query panicked or was cancelled.
    #[error("the database task did not complete: {0}")]
    BlockingTaskFailed(String),

    /// An HTTP client for an external collaborator could not be built.
    #[error("could not build HTTP client: {0}")]
    HttpClient(String),

    /// The identity provider could not be reached or gave an unexpected answer.
    #[error("identity provider error: {0}")]
    IdentityProvider(String),

    /// The categorization service failed.
    ///
    /// The message is shown to the client when suggesting a category, so it should be short
    /// and free of internal details. It may be empty when the fault carries no message.
    #[error("{0}")]
    Categorizer(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

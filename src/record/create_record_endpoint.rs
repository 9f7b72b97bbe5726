//! Defines the endpoint for creating a new expense record.
use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::{Form, FormRejection};
use rusqlite::Connection;
use serde::Serialize;

use crate::{
    AppState, endpoints,
    api_result::{ApiError, ApiResult},
    db::run_blocking,
    identity::CurrentUser,
    invalidation::ViewInvalidation,
    record::{ExpenseRecord, RecordForm, core::format_timestamp, create_record, validate_record},
};

/// The views that show aggregates over a user's records.
const STALE_AFTER_CREATE: &[&str] = &[endpoints::BEST_WORST, endpoints::SUMMARY];

/// The state needed to create a record.
#[derive(Debug, Clone)]
pub struct CreateRecordState {
    /// The database connection for managing records.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Where to announce that the summaries are stale.
    pub view_invalidation: ViewInvalidation,
}

impl FromRef<AppState> for CreateRecordState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            view_invalidation: state.view_invalidation.clone(),
        }
    }
}

/// The stored fields of a new record, as sent back to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordData {
    /// What the money was spent on.
    pub text: String,
    /// How much was spent.
    pub amount: f64,
    /// The kind of expense.
    pub category: String,
    /// The day of the expense as RFC 3339, e.g. "2024-03-15T12:00:00Z".
    pub date: String,
}

impl TryFrom<ExpenseRecord> for RecordData {
    type Error = crate::Error;

    fn try_from(record: ExpenseRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            date: format_timestamp(record.date)?,
            text: record.text,
            amount: record.amount,
            category: record.category,
        })
    }
}

/// A route handler for creating a new expense record for the current user.
///
/// The form is validated before the caller's identity is resolved, so a malformed form is
/// reported even to unidentified callers and never costs an identity provider round trip.
pub async fn create_record_endpoint(
    State(state): State<CreateRecordState>,
    current_user: CurrentUser,
    form: Result<Form<RecordForm>, FormRejection>,
) -> ApiResult<RecordData> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("could not read record form: {rejection}");
            return ApiResult::Error(rejection.into());
        }
    };

    let new_record = match validate_record(&form) {
        Ok(new_record) => new_record,
        Err(error) => return ApiResult::Error(error.into()),
    };

    let Some(user_id) = current_user.resolve().await else {
        return ApiResult::Error(ApiError::UserNotFoundOnWrite);
    };

    let owner = user_id.clone();
    let result = run_blocking(state.db_connection, move |connection| {
        create_record(new_record, &owner, connection)
    })
    .await
    .and_then(RecordData::try_from);

    match result {
        Ok(record) => {
            state.view_invalidation.notify(STALE_AFTER_CREATE, &user_id);
            ApiResult::Data(record)
        }
        Err(error) => {
            tracing::error!("could not create record for {user_id}: {error}");
            ApiResult::Error(ApiError::RecordNotSaved)
        }
    }
}

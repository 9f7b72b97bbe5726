//! The running total of a user's spending and the number of days they spent anything.

use axum::extract::State;
use serde::Serialize;

use crate::{
    api_result::{ApiError, ApiResult},
    db::run_blocking,
    identity::CurrentUser,
    record::{count_active_days, get_total_amount},
    summary::SummaryState,
};

/// How much a user has spent and on how many days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingTotal {
    /// The sum of all the user's amounts, zero without records.
    pub record: f64,
    /// The number of distinct days with an amount above zero.
    pub days_with_records: u32,
}

/// A route handler for getting the current user's running total and active days.
///
/// The two queries are started together and both must succeed. A total too large to represent
/// is reported as a database error.
pub async fn get_spending_total(
    State(state): State<SummaryState>,
    current_user: CurrentUser,
) -> ApiResult<SpendingTotal> {
    let Some(user_id) = current_user.resolve().await else {
        return ApiResult::Error(ApiError::UserNotFound);
    };

    let total_owner = user_id.clone();
    let total = run_blocking(state.db_connection.clone(), move |connection| {
        get_total_amount(&total_owner, connection)
    });

    let days_owner = user_id.clone();
    let active_days = run_blocking(state.db_connection, move |connection| {
        count_active_days(&days_owner, connection)
    });

    match tokio::try_join!(total, active_days) {
        Ok((total, days_with_records)) => {
            let total = total.unwrap_or(0.0);

            if !total.is_finite() {
                tracing::error!("spending total for {user_id} overflowed to {total}");
                return ApiResult::Error(ApiError::Database);
            }

            ApiResult::Data(SpendingTotal {
                record: total,
                days_with_records,
            })
        }
        Err(error) => {
            tracing::error!("could not get spending total for {user_id}: {error}");
            ApiResult::Error(ApiError::Database)
        }
    }
}

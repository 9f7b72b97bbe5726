//! The largest and smallest of a user's expenses.

use axum::extract::State;
use serde::Serialize;

use crate::{
    api_result::{ApiError, ApiResult},
    db::run_blocking,
    identity::CurrentUser,
    record::get_amount_range,
    summary::SummaryState,
};

/// The most and least expensive of a user's records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestWorstExpense {
    /// The largest amount, zero without records.
    pub best_expense: f64,
    /// The smallest amount, zero without records.
    pub worst_expense: f64,
}

/// A route handler for getting the current user's largest and smallest expense.
pub async fn get_best_worst_expense(
    State(state): State<SummaryState>,
    current_user: CurrentUser,
) -> ApiResult<BestWorstExpense> {
    let Some(user_id) = current_user.resolve().await else {
        return ApiResult::Error(ApiError::UserNotFound);
    };

    let owner = user_id.clone();
    let range = run_blocking(state.db_connection, move |connection| {
        get_amount_range(&owner, connection)
    })
    .await;

    match range {
        Ok(Some(range)) => ApiResult::Data(BestWorstExpense {
            best_expense: range.max,
            worst_expense: range.min,
        }),
        Ok(None) => ApiResult::Data(BestWorstExpense {
            best_expense: 0.0,
            worst_expense: 0.0,
        }),
        Err(error) => {
            tracing::error!("could not get best and worst expense for {user_id}: {error}");
            ApiResult::Error(ApiError::Database)
        }
    }
}

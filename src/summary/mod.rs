//! Read-only endpoints that summarize a user's spending.

mod best_worst;
mod totals;

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::AppState;

pub use best_worst::{BestWorstExpense, get_best_worst_expense};
pub use totals::{SpendingTotal, get_spending_total};

/// The state needed to summarize records.
#[derive(Debug, Clone)]
pub struct SummaryState {
    /// The database connection for reading records.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SummaryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

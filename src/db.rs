//! Database setup and helpers for running queries from async request handlers.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, record::create_record_table};

/// Create the application tables if they do not already exist.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    create_record_table(connection)?;

    Ok(())
}

/// Run `query` against the shared connection on tokio's blocking thread pool.
///
/// The connection lock is held only while `query` runs and never across an `.await`.
///
/// # Errors
/// Returns:
/// - whatever error `query` returns,
/// - [Error::DatabaseLockError] if the connection lock is poisoned,
/// - [Error::BlockingTaskFailed] if the blocking task panicked or was cancelled.
pub(crate) async fn run_blocking<T, F>(
    db_connection: Arc<Mutex<Connection>>,
    query: F,
) -> Result<T, Error>
where
    F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let connection = db_connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        query(&connection)
    })
    .await
    .map_err(|error| Error::BlockingTaskFailed(error.to_string()))?
}

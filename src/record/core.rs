//! Defines the expense record model and the queries that store it.

use rusqlite::{Connection, Row, types::Type};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{Error, database_id::RecordId, identity::UserId};

// ============================================================================
// MODELS
// ============================================================================

/// One expense a user has recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRecord {
    /// The ID assigned by the database.
    pub id: RecordId,
    /// What the money was spent on.
    pub text: String,
    /// How much was spent, never negative.
    pub amount: f64,
    /// The kind of expense, e.g. "Food".
    pub category: String,
    /// The day of the expense at 12:00:00 UTC.
    pub date: OffsetDateTime,
    /// The user the record belongs to.
    pub user_id: UserId,
    /// When the record was stored.
    pub created_at: OffsetDateTime,
}

/// The validated fields of a record that has not been stored yet.
///
/// Create one with [crate::validate_record].
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    /// Trimmed, between 1 and 255 characters.
    pub text: String,
    /// Finite and zero or greater.
    pub amount: f64,
    /// Trimmed, between 1 and 100 characters.
    pub category: String,
    /// Midday UTC on the expense's calendar day.
    pub date: OffsetDateTime,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Store `new_record` as belonging to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidTimestamp] if the date cannot be formatted,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_record(
    new_record: NewRecord,
    user_id: &UserId,
    connection: &Connection,
) -> Result<ExpenseRecord, Error> {
    let date = format_timestamp(new_record.date)?;

    let record = connection
        .prepare(
            "INSERT INTO record (text, amount, category, date, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, text, amount, category, date, user_id, created_at",
        )?
        .query_row(
            (
                new_record.text,
                new_record.amount,
                new_record.category,
                date,
                user_id.as_str(),
            ),
            map_record_row,
        )?;

    Ok(record)
}

/// Get the number of records stored for `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_records(user_id: &UserId, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM record WHERE user_id = ?1",
            [user_id.as_str()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the record table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS record (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount >= 0),
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
                );

        CREATE INDEX IF NOT EXISTS idx_record_user_date ON record(user_id, date);

        CREATE TRIGGER IF NOT EXISTS record_user_id_immutable
            BEFORE UPDATE OF user_id ON record
            BEGIN
                SELECT RAISE(ABORT, 'the owner of a record cannot be changed');
            END;",
    )
}

/// Map a database row to an [ExpenseRecord].
pub fn map_record_row(row: &Row) -> Result<ExpenseRecord, rusqlite::Error> {
    let id = row.get(0)?;
    let text = row.get(1)?;
    let amount = row.get(2)?;
    let category = row.get(3)?;
    let date = parse_timestamp_column(row, 4)?;
    let user_id: String = row.get(5)?;
    let created_at = parse_timestamp_column(row, 6)?;

    Ok(ExpenseRecord {
        id,
        text,
        amount,
        category,
        date,
        user_id: UserId::new_unchecked(&user_id),
        created_at,
    })
}

fn parse_timestamp_column(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let text: String = row.get(index)?;

    OffsetDateTime::parse(&text, &Rfc3339)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

/// Format `timestamp` the way it is stored and sent to clients, e.g. "2024-03-15T12:00:00Z".
///
/// # Errors
/// Returns [Error::InvalidTimestamp] if the timestamp cannot be expressed in RFC 3339, e.g. a
/// year beyond 9999.
pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, Error> {
    timestamp
        .format(&Rfc3339)
        .map_err(|error| Error::InvalidTimestamp(error.to_string()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
pub(crate) fn get_record(id: RecordId, connection: &Connection) -> Result<ExpenseRecord, Error> {
    let record = connection
        .prepare(
            "SELECT id, text, amount, category, date, user_id, created_at FROM record WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_record_row)?;

    Ok(record)
}

//! Aggregate queries over one user's records.

use rusqlite::Connection;

use crate::{Error, identity::UserId};

/// The smallest and largest amount among a user's records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountRange {
    /// The smallest amount.
    pub min: f64,
    /// The largest amount.
    pub max: f64,
}

/// Get the smallest and largest amount `user_id` has recorded, or `None` if they have no
/// records.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_amount_range(
    user_id: &UserId,
    connection: &Connection,
) -> Result<Option<AmountRange>, Error> {
    let (min, max): (Option<f64>, Option<f64>) = connection.query_row(
        "SELECT MIN(amount), MAX(amount) FROM record WHERE user_id = ?1",
        [user_id.as_str()],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(min.zip(max).map(|(min, max)| AmountRange { min, max }))
}

/// Get the sum of all amounts `user_id` has recorded, or `None` if they have no records.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn get_total_amount(user_id: &UserId, connection: &Connection) -> Result<Option<f64>, Error> {
    connection
        .query_row(
            "SELECT SUM(amount) FROM record WHERE user_id = ?1",
            [user_id.as_str()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Count the calendar days on which `user_id` spent more than zero.
///
/// Dates are stored at midday UTC, so equal dates are the same calendar day.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_active_days(user_id: &UserId, connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row(
            "SELECT COUNT(DISTINCT date) FROM record WHERE user_id = ?1 AND amount > 0",
            [user_id.as_str()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

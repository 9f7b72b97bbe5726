//! Checks and normalizes the fields submitted for a new expense record.

use serde::Deserialize;
use time::{Date, Month, Time, macros::time};

use crate::record::NewRecord;

/// The longest description allowed, in UTF-16 code units.
pub const MAX_TEXT_LENGTH: usize = 255;
/// The longest category allowed, in UTF-16 code units.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// Years before this are two-digit years in disguise and are not accepted.
const MIN_YEAR: i32 = 100;

/// The time of day, in UTC, that every record's date is pinned to.
const MIDDAY: Time = time!(12:00);

/// The raw fields submitted for a new record.
///
/// Every field is optional so that missing fields produce a validation message instead of a
/// rejected request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecordForm {
    /// What the money was spent on.
    pub text: Option<String>,
    /// How much was spent, as a number or a numeric string.
    pub amount: Option<AmountInput>,
    /// The kind of expense.
    pub category: Option<String>,
    /// The calendar day in the format YYYY-MM-DD.
    pub date: Option<String>,
}

/// An amount as submitted by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// An amount that is already a number.
    Number(f64),
    /// An amount as text, e.g. from a form field.
    Text(String),
}

/// Why a submitted record was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The text was missing or blank.
    #[error("Text is required")]
    TextRequired,
    /// The text was longer than [MAX_TEXT_LENGTH] characters.
    #[error("Text must be 255 characters or less")]
    TextTooLong,
    /// The amount was not a number or not finite.
    #[error("Amount must be a valid number")]
    InvalidAmount,
    /// The amount was less than zero.
    #[error("Amount must be zero or greater")]
    NegativeAmount,
    /// The category was missing or blank.
    #[error("Category is required")]
    CategoryRequired,
    /// The category was longer than [MAX_CATEGORY_LENGTH] characters.
    #[error("Category must be 100 characters or less")]
    CategoryTooLong,
    /// The date was missing.
    #[error("Date is required")]
    DateRequired,
    /// The date was not shaped like YYYY-MM-DD.
    #[error("Date must follow YYYY-MM-DD format")]
    DateFormat,
    /// The date was shaped like YYYY-MM-DD but is not a day on the calendar, e.g. 2023-02-30,
    /// or falls before the year 100.
    #[error("Date is invalid")]
    DateInvalid,
}

/// Check the fields of `form` in the order text, amount, category, date and return the
/// normalized record, or the first problem found.
///
/// # Errors
/// Returns the [ValidationError] for the first field that fails its checks.
pub fn validate_record(form: &RecordForm) -> Result<NewRecord, ValidationError> {
    let text = validate_text(form.text.as_deref())?;
    let amount = validate_amount(form.amount.as_ref())?;
    let category = validate_category(form.category.as_deref())?;
    let date = validate_date(form.date.as_deref())?;

    Ok(NewRecord {
        text,
        amount,
        category,
        date: date.with_time(MIDDAY).assume_utc(),
    })
}

fn validate_text(text: Option<&str>) -> Result<String, ValidationError> {
    let text = text.unwrap_or_default().trim();

    if text.is_empty() {
        Err(ValidationError::TextRequired)
    } else if text_length(text) > MAX_TEXT_LENGTH {
        Err(ValidationError::TextTooLong)
    } else {
        Ok(text.to_owned())
    }
}

/// The length of `text` in UTF-16 code units, the unit browsers use for field lengths.
pub(crate) fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}

/// A missing or blank amount counts as zero.
fn validate_amount(amount: Option<&AmountInput>) -> Result<f64, ValidationError> {
    let amount = match amount {
        Some(AmountInput::Number(number)) => *number,
        Some(AmountInput::Text(text)) if text.trim().is_empty() => 0.0,
        Some(AmountInput::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidAmount)?,
        None => 0.0,
    };

    if !amount.is_finite() {
        return Err(ValidationError::InvalidAmount);
    }

    if amount < 0.0 {
        return Err(ValidationError::NegativeAmount);
    }

    // Turns -0.0 into 0.0.
    if amount == 0.0 { Ok(0.0) } else { Ok(amount) }
}

fn validate_category(category: Option<&str>) -> Result<String, ValidationError> {
    let category = category.unwrap_or_default().trim();

    if category.is_empty() {
        Err(ValidationError::CategoryRequired)
    } else if text_length(category) > MAX_CATEGORY_LENGTH {
        Err(ValidationError::CategoryTooLong)
    } else {
        Ok(category.to_owned())
    }
}

fn validate_date(date: Option<&str>) -> Result<Date, ValidationError> {
    let Some(date) = date else {
        return Err(ValidationError::DateRequired);
    };

    let (year, month, day) = split_date(date.trim()).ok_or(ValidationError::DateFormat)?;

    if year < MIN_YEAR {
        return Err(ValidationError::DateInvalid);
    }

    let month = Month::try_from(month).map_err(|_| ValidationError::DateInvalid)?;

    Date::from_calendar_date(year, month, day).map_err(|_| ValidationError::DateInvalid)
}

/// Split a YYYY-MM-DD string into its numeric parts without checking the calendar.
fn split_date(date: &str) -> Option<(i32, u8, u8)> {
    let bytes = date.as_bytes();

    let is_shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });

    if !is_shaped {
        return None;
    }

    let year = date[0..4].parse().ok()?;
    let month = date[5..7].parse().ok()?;
    let day = date[8..10].parse().ok()?;

    Some((year, month, day))
}

//! Expense records: validating submitted fields, storing them, and aggregating over them.

mod aggregate;
mod core;
mod create_record_endpoint;
mod validation;

pub use aggregate::{AmountRange, count_active_days, get_amount_range, get_total_amount};
pub use core::{ExpenseRecord, NewRecord, count_records, create_record, create_record_table};
pub use create_record_endpoint::{RecordData, create_record_endpoint};
pub use validation::{AmountInput, RecordForm, ValidationError, validate_record};
pub(crate) use validation::text_length;

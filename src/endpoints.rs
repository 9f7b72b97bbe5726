//! The API endpoints URIs.

/// The route for creating expense records.
pub const RECORDS: &str = "/api/records";
/// The route for the current user's largest and smallest expense.
pub const BEST_WORST: &str = "/api/records/best_worst";
/// The route for the current user's running total and number of days with spending.
pub const SUMMARY: &str = "/api/records/summary";
/// The route for suggesting a category for an expense description.
pub const SUGGEST_CATEGORY: &str = "/api/categories/suggest";
/// The route for the client to forget the cached identity.
pub const LOG_OUT: &str = "/api/log_out";

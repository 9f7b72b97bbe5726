//! Category suggestions from an external categorization service.

mod categorizer;
mod suggest;

pub use categorizer::{CATEGORIES, Categorizer, DEFAULT_CATEGORIZER_MODEL, HttpCategorizer};
pub use suggest::{
    CategorySuggestion, DEFAULT_CATEGORY, suggest_category, suggest_category_endpoint,
};

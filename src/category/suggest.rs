//! Suggesting a category for an expense description.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRef, State},
};
use axum_extra::extract::{Form, FormRejection};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, category::Categorizer, record::text_length};

/// The category suggested when no better answer is available.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Descriptions shorter than this, in UTF-16 code units, are not sent to the categorizer.
const MIN_DESCRIPTION_LENGTH: usize = 2;

const TOO_SHORT_MESSAGE: &str = "Description too short for AI analysis";
const UNKNOWN_ERROR_MESSAGE: &str = "An unknown AI error occurred";

/// A suggested category and, if the suggestion is only the fallback, why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySuggestion {
    /// The suggested category.
    pub category: String,
    /// Why the categorizer could not help, if it could not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CategorySuggestion {
    fn fallback(message: &str) -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_owned(),
            error: Some(message.to_owned()),
        }
    }
}

/// Suggest a category for `description`.
///
/// Never fails: when the description is too short or the categorizer fails, the suggestion is
/// [DEFAULT_CATEGORY] along with a message saying why.
pub async fn suggest_category(
    categorizer: &dyn Categorizer,
    description: Option<&str>,
) -> CategorySuggestion {
    let description = description.unwrap_or_default().trim();

    if text_length(description) < MIN_DESCRIPTION_LENGTH {
        return CategorySuggestion::fallback(TOO_SHORT_MESSAGE);
    }

    match categorizer.categorize(description).await {
        Ok(category) => CategorySuggestion {
            category,
            error: None,
        },
        Err(error) => {
            tracing::error!("could not suggest a category: {error:?}");

            match error {
                Error::Categorizer(message) if !message.is_empty() => {
                    CategorySuggestion::fallback(&message)
                }
                _ => CategorySuggestion::fallback(UNKNOWN_ERROR_MESSAGE),
            }
        }
    }
}

/// The state needed to suggest a category.
#[derive(Clone)]
pub struct SuggestCategoryState {
    /// The service that suggests categories.
    pub categorizer: Arc<dyn Categorizer>,
}

impl FromRef<AppState> for SuggestCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            categorizer: state.categorizer.clone(),
        }
    }
}

/// The form data for suggesting a category.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestCategoryForm {
    /// The expense description to categorize.
    pub description: Option<String>,
}

/// A route handler for suggesting a category for an expense description.
///
/// A body that is not a form gets the fallback category along with the reason.
pub async fn suggest_category_endpoint(
    State(state): State<SuggestCategoryState>,
    form: Result<Form<SuggestCategoryForm>, FormRejection>,
) -> Json<CategorySuggestion> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::debug!("could not read suggestion form: {rejection}");
            return Json(CategorySuggestion::fallback(&rejection.body_text()));
        }
    };

    Json(suggest_category(state.categorizer.as_ref(), form.description.as_deref()).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum_extra::extract::Form;

    use crate::{
        category::suggest::{
            CategorySuggestion, SuggestCategoryForm, SuggestCategoryState, suggest_category,
            suggest_category_endpoint,
        },
        test_utils::StubCategorizer,
    };

    #[tokio::test]
    async fn passes_trimmed_description_to_categorizer() {
        let categorizer = StubCategorizer::answering("Food");

        let got = suggest_category(&categorizer, Some("  lunch  ")).await;

        assert_eq!(
            got,
            CategorySuggestion {
                category: "Food".to_owned(),
                error: None
            }
        );
        assert_eq!(categorizer.calls(), 1);
    }

    #[tokio::test]
    async fn short_description_skips_categorizer() {
        for description in [None, Some(""), Some("   "), Some(" a ")] {
            let categorizer = StubCategorizer::answering("Food");

            let got = suggest_category(&categorizer, description).await;

            assert_eq!(
                got,
                CategorySuggestion {
                    category: "Other".to_owned(),
                    error: Some("Description too short for AI analysis".to_owned()),
                },
                "description {description:?}"
            );
            assert_eq!(categorizer.calls(), 0);
        }
    }

    #[tokio::test]
    async fn single_emoji_is_long_enough() {
        let categorizer = StubCategorizer::answering("Food");

        let got = suggest_category(&categorizer, Some("\u{1F355}")).await;

        assert_eq!(got.category, "Food");
        assert_eq!(categorizer.calls(), 1);
    }

    #[tokio::test]
    async fn categorizer_fault_falls_back_with_message() {
        let categorizer = StubCategorizer::failing("Rate limit exceeded");

        let got = suggest_category(&categorizer, Some("taxi")).await;

        assert_eq!(
            got,
            CategorySuggestion {
                category: "Other".to_owned(),
                error: Some("Rate limit exceeded".to_owned()),
            }
        );
    }

    #[tokio::test]
    async fn fault_without_message_gets_generic_message() {
        let categorizer = StubCategorizer::failing("");

        let got = suggest_category(&categorizer, Some("taxi")).await;

        assert_eq!(
            got,
            CategorySuggestion {
                category: "Other".to_owned(),
                error: Some("An unknown AI error occurred".to_owned()),
            }
        );
    }

    #[tokio::test]
    async fn endpoint_omits_error_on_success() {
        let state = SuggestCategoryState {
            categorizer: Arc::new(StubCategorizer::answering("Bills")),
        };

        let response = suggest_category_endpoint(
            State(state),
            Ok(Form(SuggestCategoryForm {
                description: Some("power bill".to_owned()),
            })),
        )
        .await;

        assert_eq!(
            serde_json::to_value(response.0).unwrap(),
            serde_json::json!({"category": "Bills"})
        );
    }
}

//! The categorization service: a trait for suggesting an expense category from a description,
//! and a client for an OpenAI-compatible chat-completions API.

use serde::{Deserialize, Serialize};

use crate::{COLLABORATOR_TIMEOUT, Error};

/// The categories the categorizer is asked to choose from.
pub const CATEGORIES: [&str; 7] = [
    "Food",
    "Transportation",
    "Entertainment",
    "Shopping",
    "Bills",
    "Healthcare",
    "Other",
];

/// The chat model used when none is configured.
pub const DEFAULT_CATEGORIZER_MODEL: &str = "gpt-4o-mini";

/// Something that can suggest a category for an expense description.
#[async_trait::async_trait]
pub trait Categorizer: Send + Sync {
    /// Suggest a category for `description`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Categorizer] if no category could be suggested. Its message may be
    /// shown to the user.
    async fn categorize(&self, description: &str) -> Result<String, Error>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Asks a chat-completions API to pick one of [CATEGORIES].
#[derive(Debug, Clone)]
pub struct HttpCategorizer {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpCategorizer {
    /// Create a client for the chat-completions API at `base_url`, e.g.
    /// "https://api.openai.com/v1".
    ///
    /// # Errors
    ///
    /// Returns an [Error::HttpClient] if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: Option<String>, model: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(COLLABORATOR_TIMEOUT)
            .build()
            .map_err(|error| Error::HttpClient(error.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
            model: model.to_owned(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request(&self, description: &str) -> ChatRequest<'_> {
        let system_prompt = format!(
            "You are an expense categorization assistant. Reply with exactly one of these \
             categories and nothing else: {}.",
            CATEGORIES.join(", ")
        );

        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: format!("Categorize this expense: \"{description}\""),
                },
            ],
            temperature: 0.1,
            max_tokens: 20,
        }
    }
}

#[async_trait::async_trait]
impl Categorizer for HttpCategorizer {
    async fn categorize(&self, description: &str) -> Result<String, Error> {
        let mut request = self
            .client
            .post(self.completions_url())
            .json(&self.build_request(description));

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|error| {
            tracing::error!("could not reach categorizer: {error}");
            Error::Categorizer("Could not reach the categorization service".to_owned())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("categorizer replied with status {status}");
            return Err(Error::Categorizer(format!(
                "The categorization service failed with status {}",
                status.as_u16()
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|error| {
            tracing::error!("could not decode categorizer response: {error}");
            Error::Categorizer("The categorization service sent an unreadable reply".to_owned())
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_owned())
            .filter(|category| !category.is_empty())
            .ok_or_else(|| Error::Categorizer("No category suggested".to_owned()))
    }
}

//! Implements the `IdentityProvider` trait by asking a remote identity provider over HTTP.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    COLLABORATOR_TIMEOUT, Error,
    identity::{Credentials, IdentityProvider, UserId},
};

/// The header used to send the application's secret key to the identity provider.
const API_KEY_HEADER: &str = "X-Api-Key";

/// The body of a successful `GET /v1/me` response.
#[derive(Debug, Deserialize)]
struct CurrentUserResponse {
    id: String,
}

/// Asks the identity provider who owns a session token.
///
/// The provider must answer `GET {base_url}/v1/me`, authenticated with the session token as a
/// bearer token, with `200` and `{"id": "<user id>"}` for a live session and `401`, `403` or
/// `404` for an unknown or expired one.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    secret_key: Option<String>,
}

impl HttpIdentityProvider {
    /// Create a provider client for the identity provider at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HttpClient] if the HTTP client cannot be built.
    pub fn new(base_url: &str, secret_key: Option<String>) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(COLLABORATOR_TIMEOUT)
            .build()
            .map_err(|error| Error::HttpClient(error.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            secret_key,
        })
    }

    fn current_user_url(&self) -> String {
        format!("{}/v1/me", self.base_url)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn authoritative_identity(
        &self,
        credentials: &Credentials,
    ) -> Result<Option<UserId>, Error> {
        let Some(session_token) = &credentials.session_token else {
            return Ok(None);
        };

        let mut request = self
            .client
            .get(self.current_user_url())
            .bearer_auth(session_token);

        if let Some(secret_key) = &self.secret_key {
            request = request.header(API_KEY_HEADER, secret_key);
        }

        let response = request
            .send()
            .await
            .map_err(|error| Error::IdentityProvider(error.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let body: CurrentUserResponse = response
                    .json()
                    .await
                    .map_err(|error| Error::IdentityProvider(error.to_string()))?;

                Ok(UserId::new(&body.id))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            status => Err(Error::IdentityProvider(format!(
                "unexpected status {status} from {}",
                self.current_user_url()
            ))),
        }
    }
}

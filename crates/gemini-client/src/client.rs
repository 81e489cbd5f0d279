//! Gemini HTTP client.

use crate::error::GeminiError;
use crate::types::*;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini client.
///
/// The API key is stored using `SecretString` to prevent accidental
/// exposure in logs or debug output. Every request is bounded by the
/// timeout given at construction; nothing is retried.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GeminiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: SecretString::new(api_key.into()),
            model: model.into(),
        })
    }

    /// Get the configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Upload a file from disk so it can be referenced in a prompt.
    #[instrument(skip(self))]
    pub async fn upload_file(&self, path: &Path, mime_type: &str) -> Result<UploadedFile, GeminiError> {
        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len();

        let response = self
            .client
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .query(&[("uploadType", "media")])
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await?;

        let uploaded = self.handle_response::<UploadResponse>(response).await?.file;

        info!(file = %uploaded.name, uri = %uploaded.uri, size, "Uploaded file to Gemini");
        Ok(uploaded)
    }

    /// Run `generateContent` and return the text of the first candidate.
    #[instrument(skip(self, contents), fields(model = %self.model, turns = contents.len()))]
    pub async fn generate_content(&self, contents: Vec<Content>) -> Result<String, GeminiError> {
        let request = GenerateRequest {
            contents,
            generation_config: GenerationConfig::default(),
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let generated = self.handle_response::<GenerateResponse>(response).await?;

        if let Some(usage) = &generated.usage_metadata {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini token usage"
            );
        }

        generated
            .candidates
            .first()
            .map(Candidate::text)
            .ok_or(GeminiError::EmptyResponse)
    }

    /// Handle HTTP response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, GeminiError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            debug!("Response body: {}", body.chars().take(200).collect::<String>());
            serde_json::from_str(&body).map_err(GeminiError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error information from failed response.
    async fn extract_error(&self, response: reqwest::Response) -> GeminiError {
        let status = response.status();

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate limit exceeded");
                GeminiError::RateLimit
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Authentication failed");
                GeminiError::Unauthorized
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".into());
                GeminiError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

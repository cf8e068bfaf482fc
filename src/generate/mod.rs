//! Generation client: one HTTP POST to the Gemini `generateContent`
//! endpoint, envelope navigation, and payload validation.
//!
//! There is no retry logic here on purpose: every failure is terminal for
//! the attempt and surfaces as a typed [`GenerateError`].

pub mod parse;
pub mod types;
mod wire;

pub use parse::{parse_generation_result, strip_code_fence};
pub use types::{
    ExtractedPost, GeneratedComment, GenerationResult, Recommendation, ResultStatus, SentimentHint,
};

use crate::config::Config;
use crate::error::GenerateError;
use std::time::Duration;
use wire::{GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1000;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const MAX_ERROR_CHARS: usize = 300;

/// Client for the remote generation service.
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f64,
    max_output_tokens: u32,
}

impl GenerationClient {
    pub fn new() -> Self {
        Self::with_settings(
            DEFAULT_MODEL,
            DEFAULT_TEMPERATURE,
            DEFAULT_MAX_OUTPUT_TOKENS,
            DEFAULT_TIMEOUT_SECS,
        )
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_settings(
            &config.model,
            config.temperature,
            config.max_output_tokens,
            config.request_timeout_secs,
        )
    }

    fn with_settings(model: &str, temperature: f64, max_output_tokens: u32, timeout_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("CommentCraft/0.1")
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
            temperature,
            max_output_tokens,
        }
    }

    /// Point the client at a different endpoint (tests use a local mock).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run one generation request and return the validated result.
    ///
    /// The key travels as a query parameter, so the request URL must never
    /// appear in logs or error messages.
    pub async fn generate(
        &self,
        prompt: &str,
        api_key: &str,
    ) -> Result<GenerationResult, GenerateError> {
        if api_key.trim().is_empty() {
            return Err(GenerateError::MissingApiKey);
        }

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, api_key
        );
        let request =
            GenerateContentRequest::single_turn(prompt, self.temperature, self.max_output_tokens);

        let response = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                let err = err.without_url();
                GenerateError::Transport {
                    status: None,
                    message: err.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GenerateContentResponse>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .map_or_else(|| body.clone(), |err| err.message);
            return Err(GenerateError::Transport {
                status: Some(status.as_u16()),
                message: sanitize_error_message(&message),
            });
        }

        let envelope: GenerateContentResponse = response.json().await.map_err(|err| {
            tracing::debug!(error = %err.without_url(), "undecodable response envelope");
            GenerateError::ResponseShape
        })?;

        if let Some(err) = envelope.error {
            return Err(GenerateError::Transport {
                status: Some(status.as_u16()),
                message: sanitize_error_message(&err.message),
            });
        }

        let Some(text) = envelope.generated_text() else {
            return Err(GenerateError::ResponseShape);
        };

        parse_generation_result(text)
    }
}

impl Default for GenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Cap a service-reported error message to a displayable length.
fn sanitize_error_message(input: &str) -> String {
    if input.chars().count() <= MAX_ERROR_CHARS {
        return input.to_string();
    }

    let mut end = MAX_ERROR_CHARS;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &input[..end])
}

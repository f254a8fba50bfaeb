//! Language-model client traits and the Ollama implementation.
//!
//! [`OllamaClient`] talks to Ollama's native `/api/generate` endpoint.  All
//! connection details come from [`LlmConfig`]; nothing is hardcoded.  The
//! same client type serves both the text model (intent classification) and,
//! with a different configured model name, the vision model (screenshot
//! analysis).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the language model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("language model request timed out")]
    Timeout,

    /// The backend answered with a non-success status code.
    #[error("unexpected status code {0}: {1}")]
    Status(u16, String),

    /// The HTTP response could not be parsed as expected JSON.
    #[error("failed to parse model response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Async text-generation capability.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn LanguageModel>`).
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Async generation with image attachments (base64-encoded PNGs).
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate_with_images(
        &self,
        system: &str,
        prompt: &str,
        images: &[String],
    ) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<&'a [String]>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

// ---------------------------------------------------------------------------
// OllamaClient
// ---------------------------------------------------------------------------

/// Calls Ollama's `/api/generate` endpoint.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Build a client for the given model name using connection details from
    /// config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is the
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn new(config: &LlmConfig, model: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.clone(),
            model: model.to_string(),
        }
    }

    /// Build a client for the model named in `config.model`.
    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(config, &config.model.clone())
    }

    async fn request(
        &self,
        system: &str,
        prompt: &str,
        images: Option<&[String]>,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            images,
        };

        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status(status.as_u16(), body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(parsed.response)
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.request(system, prompt, None).await
    }
}

#[async_trait]
impl VisionModel for OllamaClient {
    async fn generate_with_images(
        &self,
        system: &str,
        prompt: &str,
        images: &[String],
    ) -> Result<String, LlmError> {
        self.request(system, prompt, Some(images)).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

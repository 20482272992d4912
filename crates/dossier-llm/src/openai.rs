//! OpenAI-compatible chat completions provider
//!
//! Posts to `{base_url}/v1/chat/completions` and returns the content of the
//! first choice. Any server speaking the same wire format (Azure, vLLM,
//! llama.cpp) works by changing the base URL.
//!
//! # Examples
//!
//! ```no_run
//! use dossier_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("sk-...", "gpt-3.5-turbo-0125")
//!     .unwrap()
//!     .with_base_url("http://localhost:8000");
//! ```

use crate::LlmError;
use async_trait::async_trait;
use dossier_domain::{ChatMessage, ChatRequest, LlmProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0125";

/// Default timeout for LLM requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// OpenAI chat completions client
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider for the default endpoint
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Configuration` if the key is blank or the HTTP
    /// client cannot be built.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(api_key, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider with an explicit request timeout
    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Configuration("API key is empty".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            api_key,
            client,
        })
    }

    /// Point the provider at another OpenAI-compatible server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Model name sent with each request
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

/// Pull the first choice's text out of a response body
fn first_choice(body: &str) -> Result<String, LlmError> {
    let parsed: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("No completion choices returned".to_string()))
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, request: &ChatRequest) -> Result<String, Self::Error> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(model = %self.model, messages = request.messages.len(), "chat completion request");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimitExceeded);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Communication(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, text)));
        }

        first_choice(&text)
    }
}

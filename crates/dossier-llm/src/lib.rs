//! Dossier LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `dossier-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//!
//! Neither provider retries. Retry is a policy applied by the caller (see
//! `dossier-executor::retry`).
//!
//! # Examples
//!
//! ```
//! use dossier_llm::MockProvider;
//! use dossier_domain::{ChatRequest, LlmProvider};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.complete(&ChatRequest::summarize("test prompt")).await.unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;

use async_trait::async_trait;
use dossier_domain::{ChatRequest, LlmProvider};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Missing credentials or malformed client settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Sentinel response that makes the mock fail for a prompt
const ERROR_SENTINEL: &str = "ERROR";

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses keyed by the prompt text (the last
/// message of the request) without making any network calls.
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
            delay: None,
        }
    }

    /// Sleep before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a specific response for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(prompt.into(), response.into());
    }

    /// Configure to return an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.add_response(prompt, ERROR_SENTINEL);
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) = 0;
    }

    fn answer(&self, prompt: &str) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;

        let responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        match responses.get(prompt) {
            Some(response) if response == ERROR_SENTINEL => {
                Err(LlmError::Other("Mock error".to_string()))
            }
            Some(response) => Ok(response.clone()),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn complete(&self, request: &ChatRequest) -> Result<String, Self::Error> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer(request.prompt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(prompt: &str) -> ChatRequest {
        ChatRequest::summarize(prompt)
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.complete(&req("any prompt")).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.complete(&req("hello")).await.unwrap(), "world");
        assert_eq!(provider.complete(&req("foo")).await.unwrap(), "bar");
        assert_eq!(
            provider.complete(&req("unknown")).await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.complete(&req("prompt1")).await.unwrap();
        provider.complete(&req("prompt2")).await.unwrap();
        assert_eq!(provider.call_count(), 2);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.complete(&req("bad prompt")).await;
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[tokio::test]
    async fn test_mock_provider_clone_shares_state() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&req("test")).await.unwrap();

        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_delay() {
        let provider = MockProvider::new("late").with_delay(Duration::from_millis(200));
        let request = req("anything");
        let result =
            tokio::time::timeout(Duration::from_millis(20), provider.complete(&request)).await;
        assert!(result.is_err());
        assert_eq!(provider.call_count(), 0);
    }
}

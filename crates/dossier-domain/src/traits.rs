//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Message author in a chat request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions
    System,
    /// End-user turn
    User,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub role: Role,
    /// Text
    pub content: String,
}

/// Request sent to a language model
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Conversation so far
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature; 0 asks for deterministic decoding
    pub temperature: f32,

    /// Cap on generated tokens
    pub max_tokens: u32,
}

/// System instruction sent ahead of every summarization prompt
pub const SUMMARIZER_ROLE: &str = "Act as a summarizer";

impl ChatRequest {
    /// Summarization request: a fixed role message then the prompt, both as
    /// system messages, at temperature 0 with a 200-token cap
    pub fn summarize(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: SUMMARIZER_ROLE.to_string(),
                },
                ChatMessage {
                    role: Role::System,
                    content: prompt.into(),
                },
            ],
            temperature: 0.0,
            max_tokens: 200,
        }
    }

    /// Single user message with explicit limits
    pub fn user(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            messages: vec![ChatMessage {
                role: Role::User,
                content: prompt.into(),
            }],
            temperature: 0.0,
            max_tokens,
        }
    }

    /// Text of the last message, which carries the rendered prompt
    pub fn prompt(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (dossier-llm)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run a chat completion and return the generated text
    async fn complete(&self, request: &ChatRequest) -> Result<String, Self::Error>;
}

/// Trait for web search
///
/// Implemented by the infrastructure layer (dossier-fetch)
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Error type for search operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return up to `num_results` result URLs for `query`
    async fn search(&self, query: &str, num_results: u8) -> Result<Vec<String>, Self::Error>;
}

/// Trait for turning text into countable units and back
///
/// Implemented by the application layer (dossier-extractor)
pub trait Tokenizer: Send + Sync {
    /// Error type for encode/decode
    type Error: std::error::Error + Send + Sync + 'static;

    /// Encode text into unit ids
    fn encode(&self, text: &str) -> Result<Vec<u32>, Self::Error>;

    /// Decode unit ids back into text
    fn decode(&self, ids: &[u32]) -> Result<String, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_request_shape() {
        let request = ChatRequest::summarize("Extract ONLY ...");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].content, SUMMARIZER_ROLE);
        assert!(request.messages.iter().all(|m| m.role == Role::System));
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.max_tokens, 200);
        assert_eq!(request.prompt(), "Extract ONLY ...");
    }
}

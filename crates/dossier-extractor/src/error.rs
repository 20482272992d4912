//! Error types for the Extractor

use thiserror::Error;

/// Failure inside a tokenizer backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Tokenizer error: {0}")]
pub struct TokenizerError(pub String);

/// Errors from token counting, truncation and chunking
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BudgetError {
    /// A unit budget or chunk size of zero
    #[error("Invalid budget: {name} must be a positive integer (got {value})")]
    InvalidBudget {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: usize,
    },

    /// Encode or decode failed
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
}

/// Errors loading extractor inputs (configs, prompting programs)
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// File could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Budget error
    #[error(transparent)]
    Budget(#[from] BudgetError),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}

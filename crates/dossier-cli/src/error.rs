//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Pipeline error
    #[error(transparent)]
    Pipeline(#[from] dossier_pipeline::PipelineError),

    /// Language model client error
    #[error("LLM error: {0}")]
    Llm(#[from] dossier_llm::LlmError),

    /// Search client error
    #[error("Search error: {0}")]
    Search(#[from] dossier_fetch::SearchError),

    /// Page fetcher error
    #[error("Fetch error: {0}")]
    Fetch(#[from] dossier_fetch::FetchError),

    /// Executor or retry configuration error
    #[error(transparent)]
    Executor(#[from] dossier_executor::ExecutorError),

    /// Prompt program or tokenizer error
    #[error(transparent)]
    Extractor(#[from] dossier_extractor::ExtractorError),

    /// Token budget error
    #[error(transparent)]
    Budget(#[from] dossier_extractor::BudgetError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

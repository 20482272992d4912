//! Error types for pipeline stages

use dossier_domain::DomainError;
use dossier_executor::ExecutorError;
use dossier_extractor::{BudgetError, ExtractorError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a stage
///
/// Per-item failures never surface here; they land in the stage's error
/// partitions and `errors.txt`.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A caller-supplied parameter was out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration could not be loaded or was invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// A table lacked a required column
    #[error("{path} has no '{column}' column")]
    MissingColumn {
        /// File read
        path: PathBuf,
        /// Column looked up
        column: String,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Executor rejected its parameters
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// Token budget error
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// Prompt program or extractor configuration error
    #[error(transparent)]
    Extractor(#[from] ExtractorError),

    /// Record construction or status error
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Result alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

//! Error types for the executor

use thiserror::Error;

/// Errors that stop a run before any work starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// A batch size, timeout or concurrency bound was out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration could not be parsed or serialized
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failure of a call made under a [`RetryPolicy`](crate::RetryPolicy)
#[derive(Error, Debug)]
pub enum RetryError<E> {
    /// Every attempt failed; `last` is the error from the final attempt
    #[error("{operation} failed after {attempts} attempts: {last}")]
    Exhausted {
        /// Name of the retried operation
        operation: String,
        /// Attempts made
        attempts: u32,
        /// Error returned by the last attempt
        last: E,
    },
}

impl<E> RetryError<E> {
    /// The error from the final attempt
    pub fn last(&self) -> &E {
        match self {
            RetryError::Exhausted { last, .. } => last,
        }
    }

    /// Consume the wrapper and return the final error
    pub fn into_last(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
        }
    }

    /// Number of attempts made
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
        }
    }
}

//! Error types for fetching and searching

use thiserror::Error;

/// Failure to read one source document
///
/// The fetcher catches these per URL; a failed URL contributes nothing to
/// the entity's context.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request did not finish in time
    #[error("Request to {url} timed out")]
    Timeout {
        /// Requested URL
        url: String,
    },

    /// Connection or transport failure
    #[error("Network error for {url}: {message}")]
    Network {
        /// Requested URL
        url: String,
        /// Transport message
        message: String,
    },

    /// Non-success HTTP status
    #[error("HTTP {status} for {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Status code
        status: u16,
    },

    /// The body could not be read or decoded
    #[error("Failed to decode {url}: {message}")]
    Decode {
        /// Requested URL
        url: String,
        /// Decoder message
        message: String,
    },

    /// The body was not a readable PDF
    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    /// Client construction failed
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FetchError {
    /// Map a transport error for `url` onto the closed taxonomy
    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = error.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else if error.is_decode() || error.is_body() {
            FetchError::Decode {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Errors from search providers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Transport failure
    #[error("Search request failed: {0}")]
    Communication(String),

    /// Quota or rate limit hit
    #[error("Search rate limit exceeded")]
    RateLimitExceeded,

    /// Response body was not the expected shape
    #[error("Invalid search response: {0}")]
    InvalidResponse(String),

    /// Missing credentials or bad settings
    #[error("Search configuration error: {0}")]
    Configuration(String),
}

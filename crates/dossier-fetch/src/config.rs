//! Configuration for source fetching

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Excerpt window taken around the anchor phrase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Space-separated tokens kept, starting at the anchor
    pub max_tokens: usize,

    /// Token that ends the window early when it appears within `max_tokens`
    pub cutoff_token: String,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            max_tokens: 400,
            cutoff_token: "accessibility".to_string(),
        }
    }
}

/// Configuration for [`SourceFetcher`](crate::SourceFetcher) and
/// [`HttpPageFetcher`](crate::HttpPageFetcher)
///
/// # Examples
///
/// ```
/// use dossier_fetch::FetchConfig;
///
/// let config = FetchConfig::default();
/// assert_eq!(config.anchor.max_tokens, 400);
/// assert_eq!(config.max_pdf_pages, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Excerpt window settings
    pub anchor: AnchorConfig,

    /// Pages read from the front of a PDF
    pub max_pdf_pages: usize,

    /// Per-request HTTP timeout in seconds
    pub http_timeout_secs: u64,

    /// User agent sent with page requests
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            anchor: AnchorConfig::default(),
            max_pdf_pages: 3,
            http_timeout_secs: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl FetchConfig {
    /// HTTP timeout as a duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.anchor.max_tokens == 0 {
            return Err("anchor.max_tokens must be greater than 0".to_string());
        }
        if self.max_pdf_pages == 0 {
            return Err("max_pdf_pages must be greater than 0".to_string());
        }
        if self.http_timeout_secs == 0 {
            return Err("http_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

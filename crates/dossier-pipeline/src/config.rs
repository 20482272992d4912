//! Pipeline configuration
//!
//! One TOML document configures every stage:
//!
//! ```toml
//! output_dir = "out"
//!
//! [search]
//! results_per_query = 4
//!
//! [executor]
//! batch_size = 100
//! per_item_timeout_secs = 200
//!
//! [llm]
//! model = "gpt-3.5-turbo-0125"
//! ```

use crate::error::{PipelineError, Result};
use dossier_executor::{ExecutorConfig, RetryConfig};
use dossier_extractor::BudgetConfig;
use dossier_fetch::FetchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Search stage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Links kept per candidate (1 to 4)
    pub results_per_query: u8,

    /// Pause between consecutive searches, in milliseconds
    pub delay_ms: u64,

    /// Pause between searches for explicitly listed rows, in milliseconds
    pub row_delay_ms: u64,

    /// Retry applied to each search call
    pub retry: RetryConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            results_per_query: 4,
            delay_ms: 600,
            row_delay_ms: 250,
            retry: RetryConfig::search(),
        }
    }
}

impl SearchConfig {
    /// Pause between searches
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Pause between searches for explicit rows
    pub fn row_delay(&self) -> Duration {
        Duration::from_millis(self.row_delay_ms)
    }
}

/// Language-model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model name sent with each request
    pub model: String,

    /// API base URL; the provider default when unset
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Retry applied to each call
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo-0125".to_string(),
            base_url: None,
            timeout_secs: 60,
            retry: RetryConfig::summarize(),
        }
    }
}

/// Settings for every stage of both pipelines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory stage files are written to and read from
    pub output_dir: PathBuf,

    /// Candidate source table
    pub source_table: PathBuf,

    /// Search stage
    pub search: SearchConfig,

    /// Scraping
    pub fetch: FetchConfig,

    /// Batching of the scrape stage
    pub executor: ExecutorConfig,

    /// Language model
    pub llm: LlmConfig,

    /// Token budgets for case documents
    pub budget: BudgetConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            source_table: PathBuf::from("ldata_R_unique.csv"),
            search: SearchConfig::default(),
            fetch: FetchConfig::default(),
            executor: ExecutorConfig::default(),
            llm: LlmConfig::default(),
            budget: BudgetConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        if !(1..=4).contains(&self.search.results_per_query) {
            return Err(PipelineError::InvalidParameter(format!(
                "search.results_per_query must be between 1 and 4 (got {})",
                self.search.results_per_query
            )));
        }
        self.search.retry.validate()?;
        self.fetch.validate().map_err(PipelineError::Config)?;
        self.executor.validate()?;
        self.llm.retry.validate()?;
        if self.llm.model.trim().is_empty() {
            return Err(PipelineError::Config("llm.model must not be empty".to_string()));
        }
        self.budget.validate().map_err(PipelineError::Config)?;
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| PipelineError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("Failed to serialize to TOML: {}", e)))
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::from_toml(&std::fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }
}

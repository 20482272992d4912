//! Configuration for batched execution and retries

use crate::error::ExecutorError;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for [`run_batches`](crate::run_batches)
///
/// # Examples
///
/// ```
/// use dossier_executor::ExecutorConfig;
///
/// let config = ExecutorConfig::default();
/// assert_eq!(config.batch_size, 100);
/// assert_eq!(config.per_item_timeout_secs, 200.0);
/// assert_eq!(config.timeout_retry_rounds, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Items per batch
    pub batch_size: usize,

    /// Time each item may take before it is abandoned, in seconds
    pub per_item_timeout_secs: f64,

    /// Upper bound on items running at once within a batch; the whole batch
    /// when unset
    pub max_concurrency: Option<usize>,

    /// Extra rounds that re-run the items that timed out
    pub timeout_retry_rounds: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            per_item_timeout_secs: 200.0,
            max_concurrency: None,
            timeout_retry_rounds: 0,
        }
    }
}

impl ExecutorConfig {
    /// Per-item timeout as a duration
    pub fn per_item_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.per_item_timeout_secs.max(0.0))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExecutorError> {
        if self.batch_size == 0 {
            return Err(ExecutorError::InvalidParameter(
                "batch_size must be greater than 0".to_string(),
            ));
        }
        if !self.per_item_timeout_secs.is_finite() || self.per_item_timeout_secs <= 0.0 {
            return Err(ExecutorError::InvalidParameter(format!(
                "per_item_timeout_secs must be positive (got {})",
                self.per_item_timeout_secs
            )));
        }
        if self.max_concurrency == Some(0) {
            return Err(ExecutorError::InvalidParameter(
                "max_concurrency must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExecutorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExecutorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExecutorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExecutorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

/// Serializable form of a [`RetryPolicy`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts including the first call
    pub max_attempts: u32,

    /// Lower bound of every wait, in seconds
    pub min_backoff_secs: f64,

    /// Upper bound of the backoff ceiling, in seconds
    pub max_backoff_secs: f64,

    /// Scale of the exponential ceiling
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

impl RetryConfig {
    /// Preset for search calls: 6 attempts waiting 45 to 75 seconds
    pub fn search() -> Self {
        Self {
            max_attempts: 6,
            min_backoff_secs: 45.0,
            max_backoff_secs: 75.0,
            multiplier: 1.0,
        }
    }

    /// Preset for language-model calls: 6 attempts waiting 1 to 60 seconds
    pub fn summarize() -> Self {
        Self {
            max_attempts: 6,
            min_backoff_secs: 1.0,
            max_backoff_secs: 60.0,
            multiplier: 1.0,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExecutorError> {
        if self.max_attempts == 0 {
            return Err(ExecutorError::InvalidParameter(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        let finite = [self.min_backoff_secs, self.max_backoff_secs, self.multiplier]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
        if !finite {
            return Err(ExecutorError::InvalidParameter(
                "backoff values must be finite and non-negative".to_string(),
            ));
        }
        if self.min_backoff_secs > self.max_backoff_secs {
            return Err(ExecutorError::InvalidParameter(format!(
                "min_backoff_secs ({}) exceeds max_backoff_secs ({})",
                self.min_backoff_secs, self.max_backoff_secs
            )));
        }
        Ok(())
    }

    /// Build the policy, with the default jitter and logging hook
    pub fn to_policy(&self) -> Result<RetryPolicy, ExecutorError> {
        self.validate()?;
        Ok(RetryPolicy::new(
            self.max_attempts,
            Duration::from_secs_f64(self.min_backoff_secs),
            Duration::from_secs_f64(self.max_backoff_secs),
        )
        .with_multiplier(self.multiplier))
    }
}

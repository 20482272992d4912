//! Configuration for token budgets

use crate::budget::TokenBudgeter;
use crate::error::BudgetError;
use crate::tokenizer::{AnyTokenizer, CharTokenizer, HfTokenizer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Chunk sizes the case-document tooling accepts
pub const ALLOWED_CHUNK_SIZES: [usize; 3] = [1_000, 2_500, 5_000];

/// Token budget configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Units kept when truncating text embedded in a classification or
    /// summary prompt
    pub max_units: usize,

    /// Units per piece when chunking documents
    pub chunk_size: usize,

    /// `tokenizer.json` to load; character units when unset
    pub tokenizer_path: Option<PathBuf>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_units: 12_000,
            chunk_size: 2_500,
            tokenizer_path: None,
        }
    }
}

impl BudgetConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_units == 0 {
            return Err("max_units must be greater than 0".to_string());
        }
        if !ALLOWED_CHUNK_SIZES.contains(&self.chunk_size) {
            return Err(format!(
                "chunk_size must be one of {:?} (got {})",
                ALLOWED_CHUNK_SIZES, self.chunk_size
            ));
        }
        Ok(())
    }

    /// Build the tokenizer this configuration names
    pub fn tokenizer(&self) -> Result<AnyTokenizer, BudgetError> {
        match &self.tokenizer_path {
            Some(path) => Ok(AnyTokenizer::Hf(HfTokenizer::from_file(path)?)),
            None => Ok(AnyTokenizer::Char(CharTokenizer)),
        }
    }

    /// Build a budgeter over the configured tokenizer
    pub fn budgeter(&self) -> Result<TokenBudgeter<AnyTokenizer>, BudgetError> {
        Ok(TokenBudgeter::new(self.tokenizer()?))
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

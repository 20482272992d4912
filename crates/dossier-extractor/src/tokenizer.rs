//! Tokenizer backends for the token budgeter

use crate::error::TokenizerError;
use dossier_domain::Tokenizer;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// One unit per Unicode scalar value
///
/// Lossless for every input, so truncation and chunking split only on
/// character boundaries. Used offline and in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    type Error = TokenizerError;

    fn encode(&self, text: &str) -> Result<Vec<u32>, Self::Error> {
        Ok(text.chars().map(u32::from).collect())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, Self::Error> {
        ids.iter()
            .map(|&id| {
                char::from_u32(id)
                    .ok_or_else(|| TokenizerError(format!("invalid scalar value {}", id)))
            })
            .collect()
    }
}

/// Subword tokenizer loaded from a `tokenizer.json` file
#[derive(Clone)]
pub struct HfTokenizer {
    inner: Arc<tokenizers::Tokenizer>,
}

impl HfTokenizer {
    /// Load a tokenizer definition from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TokenizerError> {
        let path = path.as_ref();
        info!("Loading tokenizer from {}", path.display());
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| TokenizerError(format!("Failed to load tokenizer: {}", e)))?;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }
}

impl std::fmt::Debug for HfTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfTokenizer").finish_non_exhaustive()
    }
}

impl Tokenizer for HfTokenizer {
    type Error = TokenizerError;

    fn encode(&self, text: &str) -> Result<Vec<u32>, Self::Error> {
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| TokenizerError(format!("Tokenization failed: {}", e)))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String, Self::Error> {
        self.inner
            .decode(ids, false)
            .map_err(|e| TokenizerError(format!("Detokenization failed: {}", e)))
    }
}

/// Tokenizer chosen at runtime from configuration
#[derive(Debug, Clone)]
pub enum AnyTokenizer {
    /// Character units
    Char(CharTokenizer),
    /// Subword units
    Hf(HfTokenizer),
}

impl Default for AnyTokenizer {
    fn default() -> Self {
        AnyTokenizer::Char(CharTokenizer)
    }
}

impl Tokenizer for AnyTokenizer {
    type Error = TokenizerError;

    fn encode(&self, text: &str) -> Result<Vec<u32>, Self::Error> {
        match self {
            AnyTokenizer::Char(t) => t.encode(text),
            AnyTokenizer::Hf(t) => t.encode(text),
        }
    }

    fn decode(&self, ids: &[u32]) -> Result<String, Self::Error> {
        match self {
            AnyTokenizer::Char(t) => t.decode(ids),
            AnyTokenizer::Hf(t) => t.decode(ids),
        }
    }
}

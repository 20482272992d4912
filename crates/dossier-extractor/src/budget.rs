//! Token-budget counting, truncation and chunking

use crate::error::{BudgetError, TokenizerError};
use dossier_domain::Tokenizer;

/// Bounds text to a unit budget using a pluggable tokenizer
#[derive(Debug, Clone, Default)]
pub struct TokenBudgeter<T> {
    tokenizer: T,
}

impl<T> TokenBudgeter<T>
where
    T: Tokenizer,
    T::Error: Into<TokenizerError>,
{
    /// Create a budgeter over `tokenizer`
    pub fn new(tokenizer: T) -> Self {
        Self { tokenizer }
    }

    /// Number of units in `text`
    pub fn count(&self, text: &str) -> Result<usize, BudgetError> {
        Ok(self.encode(text)?.len())
    }

    /// Whether `text` fits in `max_units`
    pub fn fits(&self, text: &str, max_units: usize) -> Result<bool, BudgetError> {
        check("max_units", max_units)?;
        Ok(self.count(text)? <= max_units)
    }

    /// Cut `text` to at most `max_units` units
    ///
    /// Text that already fits comes back unchanged, byte for byte; otherwise
    /// the first `max_units` units are decoded.
    pub fn truncate(&self, text: &str, max_units: usize) -> Result<String, BudgetError> {
        check("max_units", max_units)?;
        let ids = self.encode(text)?;
        if ids.len() <= max_units {
            return Ok(text.to_string());
        }
        self.decode(&ids[..max_units])
    }

    /// Split `text` into contiguous pieces of at most `unit_size` units
    ///
    /// Pieces come out in order and cover the input with no gaps or overlap.
    /// Empty input yields no pieces.
    pub fn chunk(&self, text: &str, unit_size: usize) -> Result<Vec<String>, BudgetError> {
        check("unit_size", unit_size)?;
        let ids = self.encode(text)?;
        ids.chunks(unit_size).map(|slice| self.decode(slice)).collect()
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, BudgetError> {
        self.tokenizer
            .encode(text)
            .map_err(|e| BudgetError::Tokenizer(e.into()))
    }

    fn decode(&self, ids: &[u32]) -> Result<String, BudgetError> {
        self.tokenizer
            .decode(ids)
            .map_err(|e| BudgetError::Tokenizer(e.into()))
    }
}

fn check(name: &'static str, value: usize) -> Result<(), BudgetError> {
    if value == 0 {
        return Err(BudgetError::InvalidBudget { name, value });
    }
    Ok(())
}

//! Token counts of a document set

use crate::error::Result;
use dossier_domain::{CaseDocument, Tokenizer};
use dossier_extractor::{TokenBudgeter, TokenizerError};
use serde::Serialize;

/// How much of the budget a document set uses, before and after truncation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenReport {
    /// Documents counted
    pub documents: usize,
    /// Units across all documents
    pub total_units: usize,
    /// Whole units per document
    pub average_units: usize,
    /// Documents longer than the budget
    pub over_budget: usize,
    /// Units after truncating each document to the budget
    pub truncated_total_units: usize,
    /// Whole units per document after truncation
    pub truncated_average_units: usize,
}

/// Count units per document, then again after truncating to `max_units`
pub fn token_report<T>(
    docs: &[CaseDocument],
    budgeter: &TokenBudgeter<T>,
    max_units: usize,
) -> Result<TokenReport>
where
    T: Tokenizer,
    T::Error: Into<TokenizerError>,
{
    let mut report = TokenReport {
        documents: docs.len(),
        ..Default::default()
    };
    for doc in docs {
        report.total_units += budgeter.count(&doc.textdata)?;
        if !budgeter.fits(&doc.textdata, max_units)? {
            report.over_budget += 1;
        }
        let truncated = budgeter.truncate(&doc.textdata, max_units)?;
        report.truncated_total_units += budgeter.count(&truncated)?;
    }
    if report.documents > 0 {
        report.average_units = report.total_units / report.documents;
        report.truncated_average_units = report.truncated_total_units / report.documents;
    }
    Ok(report)
}

//! Violation classification of case documents

use crate::boards::{documents, with_columns};
use crate::error::Result;
use crate::output::Table;
use dossier_domain::{
    CaseDocument, ChatRequest, LlmProvider, Tokenizer, Violation, ViolationJudgments,
};
use dossier_executor::fan_out;
use dossier_extractor::{
    parse_classification, BudgetError, ClassificationProgram, ClassificationPromptBuilder,
    TokenBudgeter, TokenizerError,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Written to every field of a document with no text
pub const EMPTY_LABEL: &str = "empty";

/// Written to every field when the call or the decode failed
pub const FAILED_LABEL: &str = "failed to process";

/// Generated-token cap for a classification answer
const MAX_ANSWER_TOKENS: u32 = 500;

/// Result of classifying one document
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The document had no text; nothing was sent
    Empty,

    /// Truncation, the call or the decode failed
    Failed(String),

    /// Decoded judgments
    Judged(ViolationJudgments),
}

impl Classification {
    /// One cell per violation, in [`Violation::ALL`] order
    ///
    /// Judgments the model left out are empty cells.
    pub fn cells(&self) -> Vec<String> {
        Violation::ALL
            .iter()
            .map(|&v| match self {
                Classification::Empty => EMPTY_LABEL.to_string(),
                Classification::Failed(_) => FAILED_LABEL.to_string(),
                Classification::Judged(j) => j
                    .get(v)
                    .map(|judgment| judgment.as_str().to_string())
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// Classify every document; results are in input order
///
/// Text is truncated to `max_units` before it is embedded in the prompt.
/// Calls fan out without a bound. A zero budget fails the whole run; any
/// other per-document problem becomes [`Classification::Failed`].
pub async fn classify_documents<L, T>(
    llm: Arc<L>,
    budgeter: &TokenBudgeter<T>,
    program: ClassificationProgram,
    docs: &[CaseDocument],
    max_units: usize,
) -> Result<Vec<Classification>>
where
    L: LlmProvider + 'static,
    T: Tokenizer,
    T::Error: Into<TokenizerError>,
{
    let builder = ClassificationPromptBuilder::new(program);
    let mut results: Vec<Option<Classification>> = vec![None; docs.len()];
    let mut jobs = Vec::new();

    for (idx, doc) in docs.iter().enumerate() {
        if doc.is_empty_text() {
            results[idx] = Some(Classification::Empty);
            continue;
        }
        match budgeter.truncate(&doc.textdata, max_units) {
            Ok(text) => jobs.push((idx, builder.build(&text))),
            Err(e @ BudgetError::InvalidBudget { .. }) => return Err(e.into()),
            Err(e) => {
                warn!(iddoc = %doc.iddoc, error = %e, "could not truncate document");
                results[idx] = Some(Classification::Failed(e.to_string()));
            }
        }
    }

    let submitted = jobs.len();
    let answered = fan_out(jobs, move |(idx, prompt): (usize, String)| {
        let llm = Arc::clone(&llm);
        async move {
            llm.complete(&ChatRequest::user(prompt, MAX_ANSWER_TOKENS))
                .await
                .map(|raw| (idx, raw))
                .map_err(|e| e.to_string())
        }
    })
    .await;

    for failure in answered.failures {
        let (idx, _) = failure.item;
        warn!(iddoc = %docs[idx].iddoc, error = %failure.cause, "classification call failed");
        results[idx] = Some(Classification::Failed(failure.cause.to_string()));
    }
    for (idx, raw) in answered.successes {
        results[idx] = Some(match parse_classification(&raw) {
            Ok(judgments) => Classification::Judged(judgments),
            Err(e) => {
                warn!(iddoc = %docs[idx].iddoc, reason = %e.reason, "unparseable classification");
                Classification::Failed(e.reason)
            }
        });
    }

    info!(documents = docs.len(), submitted, "classified documents");
    Ok(results
        .into_iter()
        .map(|r| r.unwrap_or_else(|| Classification::Failed("no result".to_string())))
        .collect())
}

/// Classify every row of a document table and add one column per violation
pub async fn classify_table<L, T>(
    llm: Arc<L>,
    budgeter: &TokenBudgeter<T>,
    program: ClassificationProgram,
    table: &Table,
    max_units: usize,
) -> Result<Table>
where
    L: LlmProvider + 'static,
    T: Tokenizer,
    T::Error: Into<TokenizerError>,
{
    let docs = documents(table)?;
    let results = classify_documents(llm, budgeter, program, &docs, max_units).await?;
    let columns: Vec<&str> = Violation::ALL.iter().map(Violation::as_str).collect();
    Ok(with_columns(
        table,
        &columns,
        results.iter().map(Classification::cells).collect(),
    ))
}

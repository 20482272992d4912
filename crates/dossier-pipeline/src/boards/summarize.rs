//! One-line trouble summaries of case documents

use crate::boards::{documents, with_columns};
use crate::error::Result;
use crate::output::Table;
use dossier_domain::{CaseDocument, ChatRequest, LlmProvider, Tokenizer};
use dossier_executor::fan_out;
use dossier_extractor::{parse_summary, SummaryPromptBuilder, TokenBudgeter, TokenizerError};
use std::sync::Arc;
use tracing::{info, warn};

/// Column the summary is written to
pub const SUMMARY_COLUMN: &str = "trouble_summary";

/// Written in place of a summary that could not be produced
pub const SUMMARY_FAILED: &str = "Failed to process";

const MAX_SUMMARY_TOKENS: u32 = 200;

/// Summarize why each document's doctor was disciplined; input order
///
/// Every document is sent, including ones with no text.
pub async fn summarize_documents<L, T>(
    llm: Arc<L>,
    budgeter: &TokenBudgeter<T>,
    docs: &[CaseDocument],
    max_units: usize,
) -> Result<Vec<String>>
where
    L: LlmProvider + 'static,
    T: Tokenizer,
    T::Error: Into<TokenizerError>,
{
    let builder = SummaryPromptBuilder::new();
    let mut summaries = vec![SUMMARY_FAILED.to_string(); docs.len()];
    let mut jobs = Vec::with_capacity(docs.len());
    for (idx, doc) in docs.iter().enumerate() {
        let text = budgeter.truncate(&doc.textdata, max_units)?;
        jobs.push((idx, builder.build(&text)));
    }

    let answered = fan_out(jobs, move |(idx, prompt): (usize, String)| {
        let llm = Arc::clone(&llm);
        async move {
            llm.complete(&ChatRequest::user(prompt, MAX_SUMMARY_TOKENS))
                .await
                .map(|raw| (idx, parse_summary(&raw)))
                .map_err(|e| e.to_string())
        }
    })
    .await;

    for failure in &answered.failures {
        let (idx, _) = &failure.item;
        warn!(iddoc = %docs[*idx].iddoc, error = %failure.cause, "summary call failed");
    }
    let failed = answered.failures.len();
    for (idx, summary) in answered.successes {
        summaries[idx] = summary;
    }

    info!(documents = docs.len(), failed, "summarized documents");
    Ok(summaries)
}

/// Summarize every row of a document table into a `trouble_summary` column
pub async fn summarize_table<L, T>(
    llm: Arc<L>,
    budgeter: &TokenBudgeter<T>,
    table: &Table,
    max_units: usize,
) -> Result<Table>
where
    L: LlmProvider + 'static,
    T: Tokenizer,
    T::Error: Into<TokenizerError>,
{
    let docs = documents(table)?;
    let summaries = summarize_documents(llm, budgeter, &docs, max_units).await?;
    Ok(with_columns(
        table,
        &[SUMMARY_COLUMN],
        summaries.into_iter().map(|s| vec![s]).collect(),
    ))
}

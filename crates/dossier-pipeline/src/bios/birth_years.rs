//! Birth-year lookup over previously scraped context

use crate::bios::records::{describe, read_prompts, BIRTH_YEAR_COLUMNS};
use crate::error::Result;
use crate::output::{write_table, OutputFiles, WriteMode, BIRTH_YEARS};
use dossier_domain::{ChatRequest, LlmProvider, PromptRecord};
use dossier_executor::fan_out;
use dossier_extractor::BirthYearPromptBuilder;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The model's answer for one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BirthYear {
    /// Candidate id
    pub candid: String,

    /// Year as printed by the model, or `N/A`
    pub answer: String,
}

/// Ask for the birth year of every candidate in a retrievals file
///
/// The context is recovered from each stored prompt and re-embedded in a
/// birth-year request. Answers are written to `birth_years.csv` as the model
/// gave them; failed calls are logged and left out.
pub async fn birth_years<L>(
    llm: Arc<L>,
    retrievals: &Path,
    files: &OutputFiles,
) -> Result<Vec<BirthYear>>
where
    L: LlmProvider + 'static,
{
    let prompts = read_prompts(retrievals)?;
    let builder = BirthYearPromptBuilder::new();
    let requests: Vec<PromptRecord> = prompts
        .into_iter()
        .map(|p| {
            let c = &p.entity.candidate;
            let text = builder.build(&c.full_name, &c.state, &p.entity.context);
            PromptRecord::new(p.entity, text)
        })
        .collect();

    let answered = fan_out(requests, move |prompt: PromptRecord| {
        let llm = Arc::clone(&llm);
        async move {
            llm.complete(&ChatRequest::summarize(prompt.prompt))
                .await
                .map(|answer| BirthYear {
                    candid: prompt.entity.candidate.candid,
                    answer: answer.trim().to_string(),
                })
                .map_err(|e| e.to_string())
        }
    })
    .await;

    for failure in &answered.failures {
        files.log_error(
            &describe(&failure.item.entity),
            "extract",
            "chatFeed",
            &failure.cause.to_string(),
        );
    }

    let rows: Vec<_> = answered
        .successes
        .iter()
        .map(|y| vec![y.candid.clone(), y.answer.clone()])
        .collect();
    write_table(&files.path(BIRTH_YEARS), &BIRTH_YEAR_COLUMNS, &rows, WriteMode::Overwrite)?;
    info!(
        answered = answered.successes.len(),
        failed = answered.failures.len(),
        "birth years complete"
    );
    Ok(answered.successes)
}

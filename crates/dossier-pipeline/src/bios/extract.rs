//! Summarization stage: prompt -> model -> partitioned response

use crate::bios::records::{
    describe, extraction_row, parse_error_row, service_error_row, EXTRACTION_COLUMNS,
    PARSE_ERROR_COLUMNS, SERVICE_ERROR_COLUMNS,
};
use crate::error::Result;
use crate::output::{write_table, OutputFiles, WriteMode, PARSE_ERRORS, SERVICE_ERRORS};
use dossier_domain::{
    ChatRequest, EntityFields, EntityStatus, LlmProvider, PromptRecord, ResponseRecord,
};
use dossier_executor::{fan_out, BatchMetrics};
use dossier_extractor::parse_biography;
use std::sync::Arc;
use tracing::{info, warn};

/// Responses of one summarization run
#[derive(Debug, Default)]
pub struct ExtractionOutcome {
    /// One record per submitted prompt, in completion order
    pub responses: Vec<ResponseRecord>,

    /// Wall time of the fan-out
    pub metrics: BatchMetrics,
}

impl ExtractionOutcome {
    /// Decoded field maps
    pub fn parsed(&self) -> impl Iterator<Item = &EntityFields> {
        self.responses.iter().filter_map(|r| match r {
            ResponseRecord::Parsed { fields, .. } => Some(fields),
            _ => None,
        })
    }

    /// Number of records with the given terminal status
    pub fn count(&self, status: EntityStatus) -> usize {
        self.responses.iter().filter(|r| r.status() == status).count()
    }

    /// Write the three partitions
    ///
    /// Parsed rows go to `extractions` with `extraction_mode`; service
    /// failures always replace `service_errors.csv`; parse failures go to
    /// `parse_errors.csv` with `parse_mode`.
    pub fn write(
        &self,
        files: &OutputFiles,
        extractions: &str,
        extraction_mode: WriteMode,
        parse_mode: WriteMode,
    ) -> Result<()> {
        let mut parsed = Vec::new();
        let mut service = Vec::new();
        let mut unparsed = Vec::new();
        for response in &self.responses {
            match response {
                ResponseRecord::Parsed { fields, .. } => parsed.push(extraction_row(fields)),
                ResponseRecord::ServiceFailure { prompt, cause } => {
                    service.push(service_error_row(prompt, cause))
                }
                ResponseRecord::ParseFailure {
                    prompt,
                    raw_response,
                    cause,
                } => unparsed.push(parse_error_row(prompt, raw_response, cause)),
            }
        }

        write_table(&files.path(extractions), &EXTRACTION_COLUMNS, &parsed, extraction_mode)?;
        write_table(
            &files.path(SERVICE_ERRORS),
            &SERVICE_ERROR_COLUMNS,
            &service,
            WriteMode::Overwrite,
        )?;
        write_table(&files.path(PARSE_ERRORS), &PARSE_ERROR_COLUMNS, &unparsed, parse_mode)?;
        Ok(())
    }
}

/// Send every prompt to the model at once and partition the answers
///
/// Calls fan out without a bound; wrap `llm` in
/// [`Retrying`](dossier_executor::Retrying) to retry transient failures.
/// A call that still fails becomes a service failure and is logged under
/// `stage`; a response that does not decode becomes a parse failure with
/// the text kept verbatim.
pub async fn extract_responses<L>(
    llm: Arc<L>,
    prompts: Vec<PromptRecord>,
    files: &OutputFiles,
    stage: &str,
) -> Result<ExtractionOutcome>
where
    L: LlmProvider + 'static,
{
    let submitted = prompts.len();
    let answered = fan_out(prompts, move |prompt: PromptRecord| {
        let llm = Arc::clone(&llm);
        async move {
            let request = ChatRequest::summarize(prompt.prompt.clone());
            match llm.complete(&request).await {
                Ok(raw) => Ok((prompt, raw)),
                Err(e) => Err(e.to_string()),
            }
        }
    })
    .await;
    info!("{}", answered.metrics.summary());

    let mut outcome = ExtractionOutcome {
        metrics: answered.metrics,
        ..Default::default()
    };

    for failure in answered.failures {
        let mut prompt = failure.item;
        let cause = failure.cause.to_string();
        files.log_error(&describe(&prompt.entity), stage, "chatFeed", &cause);
        settle(&mut prompt, EntityStatus::ServiceError);
        outcome
            .responses
            .push(ResponseRecord::ServiceFailure { prompt, cause });
    }

    for (prompt, raw) in answered.successes {
        outcome.responses.push(classify(prompt, raw));
    }

    info!(
        submitted,
        parsed = outcome.count(EntityStatus::Parsed),
        service_errors = outcome.count(EntityStatus::ServiceError),
        parse_errors = outcome.count(EntityStatus::ParseError),
        "extraction complete"
    );
    Ok(outcome)
}

fn classify(mut prompt: PromptRecord, raw: String) -> ResponseRecord {
    settle(&mut prompt, EntityStatus::Responded);
    match parse_biography(&prompt, &raw) {
        Ok(fields) => {
            settle(&mut prompt, EntityStatus::Parsed);
            ResponseRecord::Parsed { prompt, fields }
        }
        Err(e) => {
            warn!(id = %prompt.entity.id(), reason = %e.reason, "unparseable response");
            settle(&mut prompt, EntityStatus::ParseError);
            ResponseRecord::ParseFailure {
                prompt,
                raw_response: e.raw_response,
                cause: e.reason,
            }
        }
    }
}

/// Move the prompt's entity to `status`, warning when the move is invalid
fn settle(prompt: &mut PromptRecord, status: EntityStatus) {
    if let Err(e) = prompt.entity.advance(status) {
        warn!(id = %prompt.entity.id(), error = %e, "unexpected status transition");
    }
}

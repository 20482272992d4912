//! Retrieval stage: entity -> context -> prompt

use crate::bios::records::{
    describe, retrieval_row, scrape_error_row, search_row, RETRIEVAL_COLUMNS,
    SCRAPE_ERROR_COLUMNS, SEARCH_COLUMNS,
};
use crate::error::Result;
use crate::output::{write_table, OutputFiles, WriteMode, RETRIEVALS, SCRAPE_ERRORS, SCRAPE_TIMEOUTS};
use dossier_domain::{DomainError, EntityRecord, EntityStatus, PromptRecord};
use dossier_executor::{fan_out, run_batches, BatchMetrics, ExecutorConfig};
use dossier_extractor::BiographyPromptBuilder;
use dossier_fetch::{PageFetcher, SourceFetcher};
use tracing::{info, warn};

/// Partitions produced by the retrieval stage
#[derive(Debug, Default)]
pub struct RetrievalOutcome {
    /// Entities with a rendered prompt, at `Prompted`
    pub prompts: Vec<PromptRecord>,

    /// Entities whose scrape exceeded the per-item timeout, at `ScrapeTimeout`
    pub timeouts: Vec<EntityRecord>,

    /// Entities whose scrape failed, at `ScrapeError`, with the cause
    pub errors: Vec<(EntityRecord, String)>,

    /// Per-batch timing of the scrape
    pub metrics: BatchMetrics,
}

impl RetrievalOutcome {
    /// Write `retrievals.csv`, `scrape_timeouts.csv` and `scrape_errors.csv`
    pub fn write(&self, files: &OutputFiles) -> Result<()> {
        let prompts: Vec<_> = self.prompts.iter().map(retrieval_row).collect();
        write_table(&files.path(RETRIEVALS), &RETRIEVAL_COLUMNS, &prompts, WriteMode::Overwrite)?;

        let timeouts: Vec<_> = self.timeouts.iter().map(search_row).collect();
        write_table(&files.path(SCRAPE_TIMEOUTS), &SEARCH_COLUMNS, &timeouts, WriteMode::Overwrite)?;

        let errors: Vec<_> = self
            .errors
            .iter()
            .map(|(entity, cause)| scrape_error_row(entity, cause))
            .collect();
        write_table(
            &files.path(SCRAPE_ERRORS),
            &SCRAPE_ERROR_COLUMNS,
            &errors,
            WriteMode::Overwrite,
        )?;
        Ok(())
    }

    /// Fresh `Searched` records for every timed-out or failed scrape
    ///
    /// Feeding these back into [`retrieve_entities`] is the in-process
    /// counterpart of rerunning the stage on `scrape_timeouts.csv`. Entities
    /// that failed outside the scrape are left out.
    pub fn requeue(&self) -> Vec<EntityRecord> {
        let failed = self.errors.iter().map(|(entity, _)| entity);
        self.timeouts
            .iter()
            .chain(failed)
            .filter_map(|entity| match entity.requeue() {
                Ok(fresh) => Some(fresh),
                Err(e) => {
                    warn!(error = %e, "not requeued");
                    None
                }
            })
            .collect()
    }
}

/// Scrape every entity's sources in batches, then build prompts
///
/// Entities must be at `Searched`. Scrapes run through [`run_batches`] with
/// the configured batch size and per-item timeout; prompt rendering fans out
/// over everything that was fetched. Each timeout and failure is also
/// appended to the error log.
pub async fn retrieve_entities<P>(
    fetcher: &SourceFetcher<P>,
    entities: Vec<EntityRecord>,
    config: &ExecutorConfig,
    files: &OutputFiles,
) -> Result<RetrievalOutcome>
where
    P: PageFetcher + 'static,
{
    let submitted = entities.len();
    let worker_fetcher = fetcher.clone();
    let scraped = run_batches(entities, config, move |mut entity: EntityRecord| {
        let fetcher = worker_fetcher.clone();
        async move {
            fetcher.fetch(&mut entity).await;
            entity.advance(EntityStatus::Fetched)?;
            Ok::<_, DomainError>(entity)
        }
    })
    .await?;
    info!("{}", scraped.metrics.summary());

    let mut outcome = RetrievalOutcome {
        metrics: scraped.metrics,
        ..Default::default()
    };

    for mut entity in scraped.timeouts {
        files.log_error(&describe(&entity), "retrieve", "bioData", "TimeoutError");
        if let Err(e) = entity.advance(EntityStatus::ScrapeTimeout) {
            warn!(error = %e, "unexpected status on timed-out entity");
        }
        outcome.timeouts.push(entity);
    }

    for failure in scraped.failures {
        let mut entity = failure.item;
        let cause = failure.cause.to_string();
        files.log_error(&describe(&entity), "retrieve", "bioData", &cause);
        if let Err(e) = entity.advance(EntityStatus::ScrapeError) {
            warn!(error = %e, "unexpected status on failed entity");
        }
        outcome.errors.push((entity, cause));
    }

    let builder = BiographyPromptBuilder::new();
    let rendered = fan_out(scraped.successes, move |mut entity: EntityRecord| async move {
        let prompt = builder.build(&entity);
        entity.advance(EntityStatus::Prompted)?;
        Ok::<_, DomainError>(PromptRecord::new(entity, prompt))
    })
    .await;

    for failure in rendered.failures {
        let cause = failure.cause.to_string();
        files.log_error(&describe(&failure.item), "retrieve", "chatPrompt", &cause);
        outcome.errors.push((failure.item, cause));
    }
    outcome.prompts = rendered.successes;

    info!(
        submitted,
        prompts = outcome.prompts.len(),
        timeouts = outcome.timeouts.len(),
        errors = outcome.errors.len(),
        "retrieval complete"
    );
    Ok(outcome)
}

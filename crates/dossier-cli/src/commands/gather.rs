//! Full biography runs and the search stage.

use crate::cli::{GatherArgs, GatherRowsArgs};
use crate::commands::{llm_provider, page_fetcher, search_provider};
use crate::config::Environment;
use crate::error::Result;
use crate::output::Formatter;
use dossier_domain::EntityStatus;
use dossier_pipeline::bios::{search_stage, BiographyPipeline, Selection};
use dossier_pipeline::output::SEARCHES;
use dossier_pipeline::{OutputFiles, PipelineConfig};

/// Execute the gather command.
pub async fn execute_gather(
    args: GatherArgs,
    config: PipelineConfig,
    env: &Environment,
    formatter: &Formatter,
) -> Result<()> {
    run(args.selection(), args.results, config, env, formatter).await
}

/// Execute the gather-rows command.
pub async fn execute_gather_rows(
    args: GatherRowsArgs,
    config: PipelineConfig,
    env: &Environment,
    formatter: &Formatter,
) -> Result<()> {
    run(Selection::Rows(args.rows), args.results, config, env, formatter).await
}

async fn run(
    selection: Selection,
    results: Option<u8>,
    mut config: PipelineConfig,
    env: &Environment,
    formatter: &Formatter,
) -> Result<()> {
    if let Some(r) = results {
        config.search.results_per_query = r;
    }
    let search = search_provider(&config, env)?;
    let llm = llm_provider(&config, env)?;
    let pages = page_fetcher(&config)?;

    let pipeline = BiographyPipeline::new(config, search, pages, llm)?;
    let report = pipeline.gather(&selection).await?;

    println!("{}", formatter.format_report("Biography run", &report)?);
    if report.rejected > 0 {
        println!(
            "{}",
            formatter.warning(&format!(
                "{} candidate(s) without an id were skipped; see errors.txt",
                report.rejected
            ))
        );
    }
    if report.scrape_timeouts > 0 {
        println!(
            "{}",
            formatter.warning(&format!(
                "{} scrape(s) timed out; run `dossier retrieve --input scrape_timeouts.csv` to retry",
                report.scrape_timeouts
            ))
        );
    }
    if report.service_errors > 0 {
        println!(
            "{}",
            formatter.warning(&format!(
                "{} model call(s) failed; run `dossier rerun` to retry",
                report.service_errors
            ))
        );
    }
    Ok(())
}

/// Execute the search command.
pub async fn execute_search(
    args: GatherArgs,
    mut config: PipelineConfig,
    env: &Environment,
    formatter: &Formatter,
) -> Result<()> {
    if let Some(r) = args.results {
        config.search.results_per_query = r;
    }
    config.validate()?;
    let provider = search_provider(&config, env)?;
    let files = OutputFiles::new(&config.output_dir);

    let outcome = search_stage(&provider, &config, &args.selection(), &files).await?;
    if !outcome.rejected.is_empty() {
        println!(
            "{}",
            formatter.warning(&format!(
                "{} candidate(s) without an id were skipped; see errors.txt",
                outcome.rejected.len()
            ))
        );
    }
    let found = outcome
        .entities
        .iter()
        .filter(|e| e.status() == EntityStatus::Searched)
        .count();
    println!(
        "{}",
        formatter.success(&format!(
            "Searched {} candidate(s); wrote {}",
            found,
            files.path(SEARCHES).display()
        ))
    );
    Ok(())
}

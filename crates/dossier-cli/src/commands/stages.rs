//! Single biography stages run from stage files.

use crate::cli::{CombineArgs, InputArgs, RerunArgs};
use crate::commands::{llm_provider, page_fetcher};
use crate::config::Environment;
use crate::error::Result;
use crate::output::Formatter;
use dossier_domain::EntityStatus;
use dossier_fetch::SourceFetcher;
use dossier_pipeline::bios::records::{read_prompts, read_searched};
use dossier_pipeline::bios::{
    birth_years, extract_responses, rerun_service_errors, retrieve_entities, ExtractionOutcome,
};
use dossier_pipeline::output::{EXTRACTIONS, RETRIEVALS, SEARCHES};
use dossier_pipeline::{combine_csv, OutputFiles, PipelineConfig, WriteMode};
use std::path::PathBuf;
use std::sync::Arc;

fn input_path(args: &InputArgs, files: &OutputFiles, default: &str) -> PathBuf {
    args.input.clone().unwrap_or_else(|| files.path(default))
}

fn print_extraction(formatter: &Formatter, label: &str, outcome: &ExtractionOutcome) {
    println!(
        "{}",
        formatter.success(&format!(
            "{}: {} parsed, {} parse error(s), {} service error(s)",
            label,
            outcome.count(EntityStatus::Parsed),
            outcome.count(EntityStatus::ParseError),
            outcome.count(EntityStatus::ServiceError),
        ))
    );
}

/// Execute the retrieve command.
pub async fn execute_retrieve(
    args: InputArgs,
    config: PipelineConfig,
    formatter: &Formatter,
) -> Result<()> {
    let files = OutputFiles::new(&config.output_dir);
    let input = input_path(&args, &files, SEARCHES);
    let entities = read_searched(&input)?;

    let fetcher = SourceFetcher::new(page_fetcher(&config)?, config.fetch.clone());
    let outcome = retrieve_entities(&fetcher, entities, &config.executor, &files).await?;
    outcome.write(&files)?;

    println!(
        "{}",
        formatter.success(&format!(
            "Built {} prompt(s); {} timeout(s), {} error(s)",
            outcome.prompts.len(),
            outcome.timeouts.len(),
            outcome.errors.len()
        ))
    );
    Ok(())
}

/// Execute the extract command.
pub async fn execute_extract(
    args: InputArgs,
    config: PipelineConfig,
    env: &Environment,
    formatter: &Formatter,
) -> Result<()> {
    let files = OutputFiles::new(&config.output_dir);
    let prompts = read_prompts(&input_path(&args, &files, RETRIEVALS))?;
    let llm = Arc::new(llm_provider(&config, env)?);

    let outcome = extract_responses(llm, prompts, &files, "extract").await?;
    outcome.write(&files, EXTRACTIONS, WriteMode::Overwrite, WriteMode::Overwrite)?;
    print_extraction(formatter, "Extraction", &outcome);
    Ok(())
}

/// Execute the rerun command.
pub async fn execute_rerun(
    args: RerunArgs,
    config: PipelineConfig,
    env: &Environment,
    formatter: &Formatter,
) -> Result<()> {
    let files = OutputFiles::new(&config.output_dir);
    let llm = Arc::new(llm_provider(&config, env)?);

    let outcome = rerun_service_errors(llm, &files, args.attempt.into()).await?;
    if outcome.responses.is_empty() {
        println!("{}", formatter.info("No service errors to rerun."));
        return Ok(());
    }
    print_extraction(formatter, "Rerun", &outcome);
    Ok(())
}

/// Execute the birth-years command.
pub async fn execute_birth_years(
    args: InputArgs,
    config: PipelineConfig,
    env: &Environment,
    formatter: &Formatter,
) -> Result<()> {
    let files = OutputFiles::new(&config.output_dir);
    let input = input_path(&args, &files, RETRIEVALS);
    let llm = Arc::new(llm_provider(&config, env)?);

    let answers = birth_years(llm, &input, &files).await?;
    println!("{}", formatter.format_birth_years(&answers)?);
    Ok(())
}

/// Execute the combine command.
pub fn execute_combine(args: CombineArgs, formatter: &Formatter) -> Result<()> {
    let rows = combine_csv(&args.dir, &args.out)?;
    println!(
        "{}",
        formatter.success(&format!(
            "Combined {} row(s) into {}",
            rows,
            args.out.display()
        ))
    );
    Ok(())
}

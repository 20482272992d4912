//! Case-document commands.

use crate::cli::{ChunkArgs, ClassifyArgs, DocumentArgs, EvaluateArgs, SampleArgs, TokensArgs};
use crate::commands::{budgeter, llm_provider};
use crate::config::Environment;
use crate::error::Result;
use crate::output::Formatter;
use dossier_extractor::ClassificationProgram;
use dossier_pipeline::boards::{
    chunk_documents, classify_table, documents, evaluate, sample_documents, summarize_table,
    token_report,
};
use dossier_pipeline::{PipelineConfig, Table};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// `<dir>/<stem>_<suffix>.csv` next to `input`.
fn derived_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "documents".to_string());
    input.with_file_name(format!("{}_{}.csv", stem, suffix))
}

/// Default name for a sample drawn with `seed`.
pub fn sample_file_name(seed: u64, count: usize) -> String {
    format!("seed_{}_{}_sample_documents.csv", seed, count)
}

fn wrote(formatter: &Formatter, what: &str, rows: usize, path: &Path) {
    println!(
        "{}",
        formatter.success(&format!("{} {} row(s) to {}", what, rows, path.display()))
    );
}

/// Execute the sample command.
pub fn execute_sample(
    args: SampleArgs,
    config: &PipelineConfig,
    formatter: &Formatter,
) -> Result<()> {
    let table = Table::read(&args.input)?;
    let (sample, _) = sample_documents(&table, args.num_samples, args.seed)?;

    let out = args
        .output
        .unwrap_or_else(|| config.output_dir.join(sample_file_name(args.seed, args.num_samples)));
    sample.write(&out)?;
    wrote(formatter, "Sampled", sample.len(), &out);
    Ok(())
}

/// Execute the chunk command.
pub fn execute_chunk(args: ChunkArgs, config: &PipelineConfig, formatter: &Formatter) -> Result<()> {
    let table = Table::read(&args.input)?;
    let chunk_size = args.chunk_size.unwrap_or(config.budget.chunk_size);
    let chunked = chunk_documents(&table, &budgeter(config)?, chunk_size)?;

    let out = args
        .output
        .unwrap_or_else(|| derived_path(&args.input, "chunked"));
    chunked.write(&out)?;
    wrote(formatter, "Chunked into", chunked.len(), &out);
    Ok(())
}

/// Execute the classify command.
pub async fn execute_classify(
    args: ClassifyArgs,
    config: &PipelineConfig,
    env: &Environment,
    formatter: &Formatter,
) -> Result<()> {
    let program = match &args.program {
        Some(path) => ClassificationProgram::load(path)?,
        None => ClassificationProgram::default(),
    };
    let DocumentArgs {
        input,
        output,
        max_tokens,
    } = args.documents;
    let table = Table::read(&input)?;
    let llm = Arc::new(llm_provider(config, env)?);
    let max_units = max_tokens.unwrap_or(config.budget.max_units);

    let classified = classify_table(llm, &budgeter(config)?, program, &table, max_units).await?;
    let out = output.unwrap_or_else(|| derived_path(&input, "classified"));
    classified.write(&out)?;
    wrote(formatter, "Classified", classified.len(), &out);
    Ok(())
}

/// Execute the summarize command.
pub async fn execute_summarize(
    args: DocumentArgs,
    config: &PipelineConfig,
    env: &Environment,
    formatter: &Formatter,
) -> Result<()> {
    let table = Table::read(&args.input)?;
    let llm = Arc::new(llm_provider(config, env)?);
    let max_units = args.max_tokens.unwrap_or(config.budget.max_units);

    let summarized = summarize_table(llm, &budgeter(config)?, &table, max_units).await?;
    let out = args
        .output
        .unwrap_or_else(|| derived_path(&args.input, "summarized"));
    summarized.write(&out)?;
    wrote(formatter, "Summarized", summarized.len(), &out);
    Ok(())
}

/// Execute the tokens command.
pub fn execute_tokens(args: TokensArgs, config: &PipelineConfig, formatter: &Formatter) -> Result<()> {
    let table = Table::read(&args.input)?;
    let docs = documents(&table)?;
    let max_units = args.max_tokens.unwrap_or(config.budget.max_units);
    let report = token_report(&docs, &budgeter(config)?, max_units)?;
    println!("{}", formatter.format_report("Token units", &report)?);
    Ok(())
}

/// Execute the evaluate command.
pub fn execute_evaluate(args: EvaluateArgs, formatter: &Formatter) -> Result<()> {
    let truth = Table::read(&args.truth)?;
    let pred = Table::read(&args.pred)?;
    let evaluation = evaluate(&truth, &pred)?;
    println!("{}", formatter.format_evaluation(&evaluation)?);
    Ok(())
}

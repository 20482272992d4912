//! Dossier CLI - Candidate biographies and medical-board case documents.

use clap::Parser;
use dossier_cli::commands;
use dossier_cli::config::load_config;
use dossier_cli::{Cli, Command, Environment, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> dossier_cli::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let env = Environment::from_env();
    let config = load_config(cli.config.as_deref(), &env, cli.output_dir.as_deref())?;
    let formatter = Formatter::new(cli.format.map(Into::into).unwrap_or_default(), !cli.no_color);

    match cli.command {
        Command::Gather(args) => commands::execute_gather(args, config, &env, &formatter).await?,
        Command::GatherRows(args) => {
            commands::execute_gather_rows(args, config, &env, &formatter).await?
        }
        Command::Search(args) => commands::execute_search(args, config, &env, &formatter).await?,
        Command::Retrieve(args) => commands::execute_retrieve(args, config, &formatter).await?,
        Command::Extract(args) => commands::execute_extract(args, config, &env, &formatter).await?,
        Command::Rerun(args) => commands::execute_rerun(args, config, &env, &formatter).await?,
        Command::BirthYears(args) => {
            commands::execute_birth_years(args, config, &env, &formatter).await?
        }
        Command::Combine(args) => commands::execute_combine(args, &formatter)?,
        Command::Sample(args) => commands::execute_sample(args, &config, &formatter)?,
        Command::Chunk(args) => commands::execute_chunk(args, &config, &formatter)?,
        Command::Classify(args) => {
            commands::execute_classify(args, &config, &env, &formatter).await?
        }
        Command::Summarize(args) => {
            commands::execute_summarize(args, &config, &env, &formatter).await?
        }
        Command::Tokens(args) => commands::execute_tokens(args, &config, &formatter)?,
        Command::Evaluate(args) => commands::execute_evaluate(args, &formatter)?,
    }

    Ok(())
}

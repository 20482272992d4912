//! CLI command definitions and argument parsing.

use clap::{ArgAction, Args, Parser, Subcommand};
use dossier_pipeline::bios::{RerunAttempt, Selection};
use std::path::PathBuf;

/// Dossier - Research candidate biographies and classify medical board cases.
#[derive(Debug, Parser)]
#[command(name = "dossier")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "DOSSIER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory stage files are written to
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run search, retrieval and extraction for a set of candidates
    Gather(GatherArgs),

    /// Run the full pipeline for explicit rows of the candidate table
    GatherRows(GatherRowsArgs),

    /// Search for candidates and write searches.csv
    Search(GatherArgs),

    /// Scrape sources and build prompts from a search-layout file
    Retrieve(InputArgs),

    /// Send the prompts of a retrieval-layout file to the model
    Extract(InputArgs),

    /// Re-send the prompts in service_errors.csv
    Rerun(RerunArgs),

    /// Ask for each candidate's birth year using stored context
    BirthYears(InputArgs),

    /// Concatenate every CSV in a directory
    Combine(CombineArgs),

    /// Draw a reproducible sample of case documents
    Sample(SampleArgs),

    /// Split case text into token-bounded chunks
    Chunk(ChunkArgs),

    /// Classify case documents against the violation questions
    Classify(ClassifyArgs),

    /// Summarize why each doctor was disciplined
    Summarize(DocumentArgs),

    /// Report token counts before and after truncation
    Tokens(TokensArgs),

    /// Compare predicted classifications to hand-coded ones
    Evaluate(EvaluateArgs),
}

/// How candidates are drawn from the source table.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ReadMode {
    /// Distinct names at random
    #[default]
    Random,
    /// The first rows, in order
    Order,
}

/// Arguments for the gather and search commands.
#[derive(Debug, Args)]
pub struct GatherArgs {
    /// Number of candidates
    #[arg(short = 'n', long)]
    pub count: usize,

    /// Search results kept per candidate (1-4)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub results: Option<u8>,

    /// How candidates are chosen
    #[arg(long, value_enum, default_value = "random")]
    pub read: ReadMode,

    /// Seed for a reproducible random draw
    #[arg(long)]
    pub seed: Option<u64>,
}

impl GatherArgs {
    /// The selection these arguments describe.
    pub fn selection(&self) -> Selection {
        match self.read {
            ReadMode::Random => Selection::Random {
                count: self.count,
                seed: self.seed,
            },
            ReadMode::Order => Selection::Order { count: self.count },
        }
    }
}

/// Arguments for the gather-rows command.
#[derive(Debug, Args)]
pub struct GatherRowsArgs {
    /// Search results kept per candidate (1-4)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub results: Option<u8>,

    /// Zero-based data rows of the candidate table
    #[arg(required = true)]
    pub rows: Vec<usize>,
}

/// Arguments for stages that read one stage file.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Stage file to read (defaults to the previous stage's output)
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

/// Which rerun this is.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum AttemptArg {
    /// Start reruns.csv afresh
    #[default]
    First,
    /// Append to reruns.csv
    Later,
}

/// Arguments for the rerun command.
#[derive(Debug, Args)]
pub struct RerunArgs {
    /// Rerun attempt
    #[arg(long, value_enum, default_value = "first")]
    pub attempt: AttemptArg,
}

/// Arguments for the combine command.
#[derive(Debug, Args)]
pub struct CombineArgs {
    /// Directory holding the CSV files
    pub dir: PathBuf,

    /// Combined output file
    pub out: PathBuf,
}

/// Arguments for the sample command.
#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Document table to sample from
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (defaults to seed_<seed>_<n>_sample_documents.csv)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Random seed (0-9)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u64).range(0..=9))]
    pub seed: u64,

    /// Number of documents (1, 2, 5, 10, 20, 25, 50 or 100)
    #[arg(long, default_value_t = 10)]
    pub num_samples: usize,
}

/// Arguments for commands that transform a document table.
#[derive(Debug, Args)]
pub struct DocumentArgs {
    /// Document table
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (defaults to a name derived from the input)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Units of case text kept in each prompt
    #[arg(long)]
    pub max_tokens: Option<usize>,
}

/// Arguments for the chunk command.
#[derive(Debug, Args)]
pub struct ChunkArgs {
    /// Document table
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (defaults to <input>_chunked.csv)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Units per chunk (1000, 2500 or 5000)
    #[arg(long)]
    pub chunk_size: Option<usize>,
}

/// Arguments for the classify command.
#[derive(Debug, Args)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub documents: DocumentArgs,

    /// Prompting program (JSON); the built-in instructions when omitted
    #[arg(long)]
    pub program: Option<PathBuf>,
}

/// Arguments for the tokens command.
#[derive(Debug, Args)]
pub struct TokensArgs {
    /// Document table
    #[arg(short, long)]
    pub input: PathBuf,

    /// Truncation budget
    #[arg(long)]
    pub max_tokens: Option<usize>,
}

/// Arguments for the evaluate command.
#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Hand-coded classifications
    #[arg(long)]
    pub truth: PathBuf,

    /// Model classifications
    #[arg(long)]
    pub pred: PathBuf,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}

impl From<AttemptArg> for RerunAttempt {
    fn from(attempt: AttemptArg) -> Self {
        match attempt {
            AttemptArg::First => RerunAttempt::First,
            AttemptArg::Later => RerunAttempt::Later,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_command() {
        let cli = Cli::parse_from(["dossier", "gather", "-n", "20", "-r", "3", "--read", "order"]);
        match cli.command {
            Command::Gather(args) => {
                assert_eq!(args.results, Some(3));
                assert_eq!(args.selection(), Selection::Order { count: 20 });
            }
            other => panic!("Expected Gather command, got {:?}", other),
        }
    }

    #[test]
    fn test_random_selection_carries_seed() {
        let cli = Cli::parse_from(["dossier", "search", "-n", "5", "--seed", "7"]);
        match cli.command {
            Command::Search(args) => assert_eq!(
                args.selection(),
                Selection::Random {
                    count: 5,
                    seed: Some(7)
                }
            ),
            other => panic!("Expected Search command, got {:?}", other),
        }
    }

    #[test]
    fn test_results_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["dossier", "gather", "-n", "5", "-r", "5"]).is_err());
    }

    #[test]
    fn test_gather_rows_requires_rows() {
        assert!(Cli::try_parse_from(["dossier", "gather-rows", "-r", "2"]).is_err());
        let cli = Cli::parse_from(["dossier", "gather-rows", "3", "17"]);
        match cli.command {
            Command::GatherRows(args) => assert_eq!(args.rows, vec![3, 17]),
            other => panic!("Expected GatherRows command, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["dossier", "rerun", "--attempt", "later", "-vv", "--no-color"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_color);
        match cli.command {
            Command::Rerun(args) => {
                assert_eq!(RerunAttempt::from(args.attempt), RerunAttempt::Later)
            }
            other => panic!("Expected Rerun command, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_seed_range() {
        assert!(Cli::try_parse_from(["dossier", "sample", "-i", "d.csv", "--seed", "10"]).is_err());
        let cli = Cli::parse_from(["dossier", "sample", "-i", "d.csv", "--seed", "2", "--num-samples", "50"]);
        match cli.command {
            Command::Sample(args) => {
                assert_eq!(args.seed, 2);
                assert_eq!(args.num_samples, 50);
            }
            other => panic!("Expected Sample command, got {:?}", other),
        }
    }
}

//! Dossier CLI library.
//!
//! Argument parsing, environment handling, provider wiring and output
//! formatting for the `dossier` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::{Environment, OutputFormat};
pub use error::{CliError, Result};
pub use output::Formatter;

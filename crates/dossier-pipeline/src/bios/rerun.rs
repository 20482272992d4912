//! Re-running prompts whose model call failed

use crate::bios::extract::{extract_responses, ExtractionOutcome};
use crate::bios::records::read_prompts;
use crate::error::{PipelineError, Result};
use crate::output::{OutputFiles, WriteMode, RERUNS, SERVICE_ERRORS};
use dossier_domain::LlmProvider;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Which rerun this is
///
/// The first rerun starts `reruns.csv` afresh; later reruns add to it so
/// earlier recoveries are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RerunAttempt {
    /// Replace `reruns.csv`
    #[default]
    First,
    /// Append to `reruns.csv`
    Later,
}

impl RerunAttempt {
    fn mode(self) -> WriteMode {
        match self {
            RerunAttempt::First => WriteMode::Overwrite,
            RerunAttempt::Later => WriteMode::Append,
        }
    }
}

impl FromStr for RerunAttempt {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "first" => Ok(RerunAttempt::First),
            "later" => Ok(RerunAttempt::Later),
            other => Err(PipelineError::InvalidParameter(format!(
                "attempt must be 'first' or 'later' (got '{}')",
                other
            ))),
        }
    }
}

/// Send every prompt in `service_errors.csv` to the model again
///
/// Recovered biographies go to `reruns.csv`, calls that fail again replace
/// `service_errors.csv`, and new parse failures are appended to
/// `parse_errors.csv`. A missing `service_errors.csv` means there is
/// nothing to rerun.
pub async fn rerun_service_errors<L>(
    llm: Arc<L>,
    files: &OutputFiles,
    attempt: RerunAttempt,
) -> Result<ExtractionOutcome>
where
    L: LlmProvider + 'static,
{
    let path = files.path(SERVICE_ERRORS);
    if !path.exists() {
        info!(path = %path.display(), "no service errors to rerun");
        return Ok(ExtractionOutcome::default());
    }

    let prompts = read_prompts(&path)?;
    info!(prompts = prompts.len(), ?attempt, "rerunning failed prompts");
    let outcome = extract_responses(llm, prompts, files, "rerun").await?;
    outcome.write(files, RERUNS, attempt.mode(), WriteMode::Append)?;
    Ok(outcome)
}

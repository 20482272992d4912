//! Configuration management for the CLI.
//!
//! Pipeline settings come from an optional TOML file; credentials and a few
//! overrides come from the process environment (after `.env` is loaded).

use crate::error::{CliError, Result};
use dossier_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Values read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    /// `GOOGLE_API_KEY`
    pub google_api_key: Option<String>,

    /// `SEARCH_ENGINE_ID`
    pub search_engine_id: Option<String>,

    /// `OPENAI_API_KEY`
    pub openai_api_key: Option<String>,

    /// `OPENAI_MODEL`
    pub openai_model: Option<String>,

    /// `OPENAI_BASE_URL`
    pub openai_base_url: Option<String>,

    /// `TOKENIZER_PATH`
    pub tokenizer_path: Option<PathBuf>,
}

impl Environment {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            google_api_key: get("GOOGLE_API_KEY"),
            search_engine_id: get("SEARCH_ENGINE_ID"),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL"),
            openai_base_url: get("OPENAI_BASE_URL"),
            tokenizer_path: get("TOKENIZER_PATH").map(PathBuf::from),
        }
    }

    /// Copy environment overrides onto a pipeline configuration.
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(model) = &self.openai_model {
            config.llm.model = model.clone();
        }
        if let Some(url) = &self.openai_base_url {
            config.llm.base_url = Some(url.clone());
        }
        if let Some(path) = &self.tokenizer_path {
            config.budget.tokenizer_path = Some(path.clone());
        }
    }

    /// Google credentials, or a configuration error naming what is missing.
    pub fn search_credentials(&self) -> Result<(&str, &str)> {
        Ok((
            require(&self.google_api_key, "GOOGLE_API_KEY")?,
            require(&self.search_engine_id, "SEARCH_ENGINE_ID")?,
        ))
    }

    /// OpenAI key, or a configuration error.
    pub fn openai_key(&self) -> Result<&str> {
        require(&self.openai_api_key, "OPENAI_API_KEY")
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| CliError::Config(format!("{} is not set", name)))
}

/// Load the pipeline configuration, falling back to defaults.
///
/// Environment overrides and `output_dir` are applied before validation.
pub fn load_config(
    path: Option<&Path>,
    env: &Environment,
    output_dir: Option<&Path>,
) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                CliError::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            PipelineConfig::from_toml(&text)?
        }
        None => PipelineConfig::default(),
    };
    env.apply(&mut config);
    if let Some(dir) = output_dir {
        config.output_dir = dir.to_path_buf();
    }
    config.validate()?;
    Ok(config)
}

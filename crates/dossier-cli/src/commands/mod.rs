//! Command implementations.
//!
//! Each command builds the collaborators it needs from the loaded
//! configuration and the environment, so stages that never search do not
//! ask for search credentials.

pub mod documents;
pub mod gather;
pub mod stages;

pub use self::documents::{
    execute_chunk, execute_classify, execute_evaluate, execute_sample, execute_summarize,
    execute_tokens,
};
pub use self::gather::{execute_gather, execute_gather_rows, execute_search};
pub use self::stages::{
    execute_birth_years, execute_combine, execute_extract, execute_rerun, execute_retrieve,
};

use crate::config::Environment;
use crate::error::Result;
use dossier_executor::Retrying;
use dossier_extractor::{AnyTokenizer, TokenBudgeter};
use dossier_fetch::{GoogleSearchProvider, HttpPageFetcher};
use dossier_llm::OpenAiProvider;
use dossier_pipeline::PipelineConfig;
use std::time::Duration;

/// Operation name used when logging search retries.
pub const SEARCH_OPERATION: &str = "googleSearch";

/// Operation name used when logging model retries.
pub const CHAT_OPERATION: &str = "chatFeed";

/// Google search wrapped in the configured retry policy.
pub fn search_provider(
    config: &PipelineConfig,
    env: &Environment,
) -> Result<Retrying<GoogleSearchProvider>> {
    let (key, engine) = env.search_credentials()?;
    let provider = GoogleSearchProvider::new(key, engine)?;
    Ok(Retrying::new(
        provider,
        config.search.retry.to_policy()?,
        SEARCH_OPERATION,
    ))
}

/// The chat model wrapped in the configured retry policy.
pub fn llm_provider(
    config: &PipelineConfig,
    env: &Environment,
) -> Result<Retrying<OpenAiProvider>> {
    let mut provider = OpenAiProvider::with_timeout(
        env.openai_key()?,
        config.llm.model.clone(),
        Duration::from_secs(config.llm.timeout_secs),
    )?;
    if let Some(url) = &config.llm.base_url {
        provider = provider.with_base_url(url.clone());
    }
    Ok(Retrying::new(
        provider,
        config.llm.retry.to_policy()?,
        CHAT_OPERATION,
    ))
}

/// HTTP page fetcher built from the scrape settings.
pub fn page_fetcher(config: &PipelineConfig) -> Result<HttpPageFetcher> {
    Ok(HttpPageFetcher::new(&config.fetch)?)
}

/// Token budgeter over the configured tokenizer.
pub fn budgeter(config: &PipelineConfig) -> Result<TokenBudgeter<AnyTokenizer>> {
    Ok(config.budget.budgeter()?)
}

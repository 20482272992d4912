//! Dossier Executor
//!
//! Batched, concurrent execution of per-item async work with partial-failure
//! isolation, plus the retry policy wrapped around external services.
//!
//! # Overview
//!
//! - [`run_batches`] partitions items into fixed-size batches, runs batches
//!   one after another and the items of a batch concurrently, each under its
//!   own timeout. Every item lands in exactly one bucket of the returned
//!   [`BatchOutcome`]: successes, timeouts or failures.
//! - [`fan_out`] spawns every item at once with no timeout and collects
//!   results in completion order.
//! - [`RetryPolicy`] retries a fallible async call with randomized
//!   exponential backoff; [`Retrying`] applies a policy to any LLM or search
//!   provider.
//!
//! # Example
//!
//! ```
//! use dossier_executor::{run_batches, ExecutorConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = ExecutorConfig::default();
//! let outcome = run_batches(vec![1u32, 2, 3], &config, |n| async move {
//!     if n == 2 { Err("two") } else { Ok(n * 10) }
//! })
//! .await
//! .unwrap();
//!
//! assert_eq!(outcome.successes, vec![10, 30]);
//! assert_eq!(outcome.failures.len(), 1);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod batch;
mod config;
mod error;
mod fan_out;
mod metrics;
mod outcome;
mod retry;

pub use batch::run_batches;
pub use config::{ExecutorConfig, RetryConfig};
pub use error::{ExecutorError, RetryError};
pub use fan_out::fan_out;
pub use metrics::{BatchMetrics, BatchTiming};
pub use outcome::{BatchOutcome, FailureCause, ItemFailure};
pub use retry::{BeforeSleep, Jitter, RetryEvent, RetryPolicy, Retrying};

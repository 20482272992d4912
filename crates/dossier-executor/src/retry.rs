//! Retry with randomized exponential backoff
//!
//! The wait before retry `n` (the attempt that just failed, counting from 1)
//! is drawn uniformly from `[min_backoff, ceiling(n)]` where
//! `ceiling(n) = clamp(multiplier * 2^(n-1), min_backoff, max_backoff)`.

use crate::error::RetryError;
use async_trait::async_trait;
use dossier_domain::{ChatRequest, LlmProvider, SearchProvider};
use rand::Rng;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Draws a wait from the inclusive range `[low, high]`
pub type Jitter = Arc<dyn Fn(Duration, Duration) -> Duration + Send + Sync>;

/// Called before each sleep between attempts
pub type BeforeSleep = Arc<dyn Fn(&RetryEvent<'_>) + Send + Sync>;

/// What the `before_sleep` hook is told about a failed attempt
#[derive(Debug, Clone, Copy)]
pub struct RetryEvent<'a> {
    /// Name of the retried operation
    pub operation: &'a str,

    /// Attempt that just failed, counting from 1
    pub attempt: u32,

    /// Wait before the next attempt
    pub delay: Duration,

    /// Rendered error from the failed attempt
    pub error: &'a str,
}

/// Retry policy for calls to external services
#[derive(Clone)]
pub struct RetryPolicy {
    /// Attempts including the first call
    pub max_attempts: u32,

    /// Lower bound of every wait
    pub min_backoff: Duration,

    /// Upper bound of the backoff ceiling
    pub max_backoff: Duration,

    /// Scale of the exponential ceiling, in seconds
    pub multiplier: f64,

    jitter: Jitter,
    before_sleep: BeforeSleep,
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("min_backoff", &self.min_backoff)
            .field("max_backoff", &self.max_backoff)
            .field("multiplier", &self.multiplier)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// Create a policy with the default jitter and logging hook
    pub fn new(max_attempts: u32, min_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_backoff,
            max_backoff: max_backoff.max(min_backoff),
            multiplier: 1.0,
            jitter: Arc::new(uniform_jitter),
            before_sleep: Arc::new(log_retry),
        }
    }

    /// Policy for search calls: 6 attempts waiting 45 to 75 seconds
    pub fn search() -> Self {
        Self::new(6, Duration::from_secs(45), Duration::from_secs(75))
    }

    /// Policy for language-model calls: 6 attempts waiting 1 to 60 seconds
    pub fn summarize() -> Self {
        Self::new(6, Duration::from_secs(1), Duration::from_secs(60))
    }

    /// A single attempt and no waiting
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Set the exponential scale
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Replace the jitter source
    pub fn with_jitter<J>(mut self, jitter: J) -> Self
    where
        J: Fn(Duration, Duration) -> Duration + Send + Sync + 'static,
    {
        self.jitter = Arc::new(jitter);
        self
    }

    /// Replace the hook called before each sleep
    pub fn with_before_sleep<H>(mut self, hook: H) -> Self
    where
        H: Fn(&RetryEvent<'_>) + Send + Sync + 'static,
    {
        self.before_sleep = Arc::new(hook);
        self
    }

    /// Upper bound of the wait after attempt `attempt` fails
    pub fn backoff_ceiling(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let secs = self.multiplier * 2f64.powi(exponent);
        let ceiling = if secs.is_finite() {
            Duration::try_from_secs_f64(secs).unwrap_or(self.max_backoff)
        } else {
            self.max_backoff
        };
        ceiling.min(self.max_backoff).max(self.min_backoff)
    }

    /// Wait to use after attempt `attempt` fails
    pub fn delay_for(&self, attempt: u32) -> Duration {
        (self.jitter)(self.min_backoff, self.backoff_ceiling(attempt))
    }

    /// Call `operation` until it succeeds or attempts run out
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Exhausted`] holding the last error once
    /// `max_attempts` calls have failed.
    pub async fn call<T, E, F, Fut>(&self, name: &str, mut operation: F) -> Result<T, RetryError<E>>
    where
        E: fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => {
                    return Err(RetryError::Exhausted {
                        operation: name.to_string(),
                        attempts: attempt,
                        last: e,
                    });
                }
                Err(e) => {
                    let delay = self.delay_for(attempt);
                    let error = e.to_string();
                    (self.before_sleep)(&RetryEvent {
                        operation: name,
                        attempt,
                        delay,
                        error: &error,
                    });
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::summarize()
    }
}

fn uniform_jitter(low: Duration, high: Duration) -> Duration {
    if high <= low {
        return low;
    }
    let secs = rand::thread_rng().gen_range(low.as_secs_f64()..=high.as_secs_f64());
    Duration::from_secs_f64(secs)
}

fn log_retry(event: &RetryEvent<'_>) {
    warn!(
        operation = event.operation,
        attempt = event.attempt,
        delay_secs = event.delay.as_secs_f64(),
        error = event.error,
        "retrying {}",
        event.operation
    );
}

/// A provider whose calls go through a [`RetryPolicy`]
#[derive(Debug, Clone)]
pub struct Retrying<P> {
    inner: P,
    policy: RetryPolicy,
    operation: String,
}

impl<P> Retrying<P> {
    /// Wrap `inner`; `operation` names the call in logs and errors
    pub fn new(inner: P, policy: RetryPolicy, operation: impl Into<String>) -> Self {
        Self {
            inner,
            policy,
            operation: operation.into(),
        }
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// The policy applied to each call
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<P: LlmProvider> LlmProvider for Retrying<P> {
    type Error = RetryError<P::Error>;

    async fn complete(&self, request: &ChatRequest) -> Result<String, Self::Error> {
        self.policy
            .call(&self.operation, || self.inner.complete(request))
            .await
    }
}

#[async_trait]
impl<P: SearchProvider> SearchProvider for Retrying<P> {
    type Error = RetryError<P::Error>;

    async fn search(&self, query: &str, num_results: u8) -> Result<Vec<String>, Self::Error> {
        self.policy
            .call(&self.operation, || self.inner.search(query, num_results))
            .await
    }
}

//! Retry loop shared by the provider clients

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::LlmError;

/// How many times and how long to wait between attempts
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Backoff before the first retry; doubles each retry
    pub initial_backoff: Duration,
    /// Cap on a provider's `retry-after` hint
    pub max_rate_limit_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
            max_rate_limit_wait: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `retry` (1-based) after `err`
    pub fn delay_for(&self, err: &LlmError, retry: u32) -> Duration {
        match err.retry_after() {
            Some(hint) => hint.min(self.max_rate_limit_wait),
            None => self.initial_backoff * 2u32.saturating_pow(retry.saturating_sub(1)),
        }
    }

    /// Run `attempt` until it succeeds, fails permanently, or retries run out
    pub async fn run<F, Fut, T>(&self, label: &str, mut attempt: F) -> Result<T, LlmError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmError>>,
    {
        debug!(%label, max_retries = self.max_retries, "RetryPolicy::run: called");
        let mut retry = 0;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && retry < self.max_retries => {
                    retry += 1;
                    let delay = self.delay_for(&err, retry);
                    warn!(%label, retry, delay_ms = delay.as_millis() as u64, error = %err, "Retrying after transient error");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    debug!(%label, retry, error = %err, "RetryPolicy::run: giving up");
                    return Err(err);
                }
            }
        }
    }
}

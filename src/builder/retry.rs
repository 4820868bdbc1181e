//! Bounded retry for catalog calls.
//!
//! Only transient failures are retried. A rate-limit response that asks for
//! a longer wait than the configured delay gets the longer wait.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;

/// How the delay grows between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// Same delay before every retry
    #[default]
    Fixed,
    /// Delay doubles after every failed attempt
    Exponential,
}

/// Retry settings for one class of call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1)
    pub attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
            backoff: Backoff::Fixed,
        }
    }
}

/// A call that did not succeed within its retry budget
#[derive(Debug, Clone, thiserror::Error)]
#[error("{operation} failed after {attempts} attempt(s): {source}")]
pub struct RetryError {
    pub operation: String,
    pub attempts: u32,
    #[source]
    pub source: CatalogError,
}

impl RetryPolicy {
    /// Run `call` until it succeeds, fails terminally, or attempts run out.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < attempts => {
                    let wait = self.delay_before_retry(attempt, &e);
                    tracing::warn!(
                        operation,
                        attempt,
                        attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Catalog call failed, retrying"
                    );
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                    attempt += 1;
                }
                Err(e) => {
                    return Err(RetryError {
                        operation: operation.to_string(),
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }

    /// Wait after the `attempt`-th failure (1-based).
    pub fn delay_before_retry(&self, attempt: u32, error: &CatalogError) -> Duration {
        let base = match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.delay.saturating_mul(factor)
            }
        };
        match error.retry_after() {
            Some(requested) if requested > base => requested,
            _ => base,
        }
    }
}

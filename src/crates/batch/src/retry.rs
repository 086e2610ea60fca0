//! Bounded retry around a single provider call.
//!
//! The policy makes at most `max_retries` attempts in total, sleeping a
//! fixed delay between attempts. Terminal errors short-circuit immediately
//! without consuming further attempts: retrying a structurally invalid
//! request only wastes the rate-limit budget.

use crate::BatchConfig;
use aiqa_core::{ProviderError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Fixed-delay retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempt budget per call.
    pub max_retries: u32,

    /// Fixed delay between attempts.
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Create a retry policy.
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries,
            retry_delay,
        }
    }

    /// Create a retry policy from batch configuration.
    pub fn from_config(config: &BatchConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay)
    }

    /// Execute `f` with bounded retries.
    ///
    /// Returns the first success, the first terminal error, or the last
    /// recoverable error once the attempt budget is exhausted. Never sleeps
    /// after the final attempt.
    pub async fn run<F, Fut, T>(&self, operation: &str, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            if attempt > 1 {
                info!(
                    operation = operation,
                    attempt = attempt,
                    max_retries = self.max_retries,
                    "Retrying provider call"
                );
            }

            match f().await {
                Ok(result) => {
                    if attempt > 1 {
                        info!(
                            operation = operation,
                            attempt = attempt,
                            "Provider call succeeded after retry"
                        );
                    }
                    return Ok(result);
                }
                Err(err) if err.is_terminal() => {
                    error!(
                        operation = operation,
                        attempt = attempt,
                        error = %err,
                        "Terminal provider error, aborting retries"
                    );
                    return Err(err);
                }
                Err(err) => {
                    warn!(
                        operation = operation,
                        attempt = attempt,
                        max_retries = self.max_retries,
                        error = %err,
                        "Recoverable provider error"
                    );
                    last_error = Some(err);

                    if attempt < self.max_retries {
                        sleep(self.retry_delay).await;
                    }
                }
            }
        }

        error!(
            operation = operation,
            max_retries = self.max_retries,
            "All attempts exhausted"
        );

        Err(last_error.unwrap_or_else(|| {
            ProviderError::Config(format!(
                "retry policy for '{}' invoked with zero attempts",
                operation
            ))
        }))
    }
}

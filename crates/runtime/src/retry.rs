//! Retry policy for round fetches.
//!
//! Transient provider failures are retried with linear backoff; anything
//! permanent is returned at once so the session can fall back.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use game_core::RetryNotice;

use crate::api::ProviderError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Wait after attempt `n` is `base_delay * n`.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Backoff applied after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent.
    ///
    /// `operation` receives the 1-based attempt number. `on_retry` is called
    /// before each backoff wait.
    pub async fn run<T, F, Fut, N>(
        &self,
        mut operation: F,
        mut on_retry: N,
    ) -> Result<T, ProviderError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
        N: FnMut(RetryNotice),
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let error = match operation(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        info!("Round fetched after {} attempts", attempt);
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                warn!("Round fetch failed permanently: {}", error);
                return Err(error);
            }

            if attempt >= max_attempts {
                warn!(
                    "Round fetch failed after {} attempts: {}",
                    max_attempts, error
                );
                return Err(error);
            }

            let delay = self.delay_after(attempt);
            warn!(
                "Round fetch failed (attempt {}/{}): {}. Retrying in {:?}...",
                attempt, max_attempts, error, delay
            );
            on_retry(RetryNotice {
                next_attempt: attempt + 1,
                attempts_remaining: max_attempts - attempt,
                error: error.to_string(),
            });

            sleep(delay).await;
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(Self::DEFAULT_BASE_DELAY_MS),
        )
    }
}

//! Retry strategies for discovery requests.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::FetchError;

/// Delay applied after GitHub's secondary rate limit body.
const SECONDARY_LIMIT_DELAY_SECS: u64 = 60;

/// Strategy for retrying failed requests.
///
/// Each call to [`RetryStrategy::run`] gets its own attempt budget.
#[derive(Debug, Clone)]
pub struct RetryStrategy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Base delay between retries in seconds.
    pub base_delay_secs: u64,
    /// Whether to use exponential backoff.
    pub exponential_backoff: bool,
    /// Maximum delay between retries.
    pub max_delay_secs: u64,
    /// Delay after a secondary rate limit, in seconds.
    pub secondary_limit_delay_secs: u64,
}

impl RetryStrategy {
    /// Creates a new retry strategy.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_secs: 1,
            exponential_backoff: true,
            max_delay_secs: 60,
            secondary_limit_delay_secs: SECONDARY_LIMIT_DELAY_SECS,
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay_secs: 0,
            exponential_backoff: false,
            max_delay_secs: 0,
            secondary_limit_delay_secs: 0,
        }
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, secs: u64) -> Self {
        self.base_delay_secs = secs;
        self
    }

    /// Sets the delay used after a secondary rate limit.
    pub fn with_secondary_limit_delay(mut self, secs: u64) -> Self {
        self.secondary_limit_delay_secs = secs;
        self
    }

    /// Enables or disables exponential backoff.
    pub fn with_exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential_backoff = enabled;
        self
    }

    /// Calculates the delay for a given attempt number.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = if self.exponential_backoff {
            let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
            self.base_delay_secs.saturating_mul(factor)
        } else {
            self.base_delay_secs
        };

        Duration::from_secs(delay.min(self.max_delay_secs))
    }

    fn delay_after(&self, error: &FetchError, attempt: u32) -> Duration {
        let delay = self.delay_for_attempt(attempt);
        if matches!(error, FetchError::SecondaryRateLimited) {
            delay.max(Duration::from_secs(self.secondary_limit_delay_secs))
        } else {
            delay
        }
    }

    /// Determines if an error should be retried.
    pub fn should_retry(&self, error: &FetchError) -> bool {
        error.is_transient()
    }

    /// Runs `op` until it succeeds, fails permanently, or the budget is spent.
    ///
    /// `op` receives the 1-based attempt number. The last error is returned
    /// once attempts run out.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && self.should_retry(&e) => {
                    let delay = self.delay_after(&e, attempt);
                    warn!(
                        label = %label,
                        error = %e,
                        attempt,
                        delay_secs = delay.as_secs(),
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::new(25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn instant() -> RetryStrategy {
        RetryStrategy::default()
            .with_base_delay(0)
            .with_secondary_limit_delay(0)
    }

    #[test]
    fn test_exponential_backoff() {
        let strategy = RetryStrategy::default();

        assert_eq!(strategy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(strategy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(strategy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(strategy.delay_for_attempt(4), Duration::from_secs(8));
    }

    #[test]
    fn test_max_delay_cap() {
        let strategy = RetryStrategy::new(10).with_base_delay(10);
        assert_eq!(strategy.delay_for_attempt(5), Duration::from_secs(60));
        assert_eq!(strategy.delay_for_attempt(64), Duration::from_secs(60));
    }

    #[test]
    fn test_secondary_limit_waits_longer() {
        let strategy = RetryStrategy::default();
        assert_eq!(
            strategy.delay_after(&FetchError::SecondaryRateLimited, 1),
            Duration::from_secs(60)
        );
        assert_eq!(
            strategy.delay_after(&FetchError::Timeout(30), 1),
            Duration::from_secs(1)
        );
    }

    #[tokio::test]
    async fn test_run_retries_transient_errors() {
        let calls = AtomicU32::new(0);
        let result = instant()
            .run("page", |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 3 {
                        Err(FetchError::Timeout(30))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_permanent_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = instant()
            .run("page", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(FetchError::InvalidResponse("bad".to_string())) }
            })
            .await;

        assert!(matches!(result, Err(FetchError::InvalidResponse(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_spends_whole_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = RetryStrategy::new(4)
            .with_base_delay(0)
            .run("page", |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(FetchError::Timeout(30)) }
            })
            .await;

        assert!(matches!(result, Err(FetchError::Timeout(30))));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}

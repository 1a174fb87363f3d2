//! Bounded retry policy for backing store calls.
//!
//! Store calls never block the scheduler indefinitely: a fixed number of
//! attempts with capped exponential backoff, then the error surfaces and
//! the current cycle fails fast.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::{FeedcastError, Result};

/// Default number of attempts per store call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default initial backoff.
pub const DEFAULT_BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Default backoff cap.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(3);

/// Retry policy with capped exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempt count, including the first try.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles after each failure.
    pub base_backoff: Duration,
    /// Upper bound on the backoff.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_backoff: DEFAULT_BASE_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// A policy that fails on the first error (used in tests).
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Backoff to apply after the given zero-based failed attempt.
    fn backoff(&self, attempt: u32) -> Duration {
        let backoff = self.base_backoff.saturating_mul(1 << attempt.min(16));
        backoff.min(self.max_backoff)
    }

    /// Run `op`, retrying store errors until the attempt budget is spent.
    ///
    /// Only `Store` errors are retried; anything else surfaces immediately.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(FeedcastError::Store(msg)) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(FeedcastError::Store(msg));
                    }
                    let backoff = self.backoff(attempt - 1);
                    warn!(
                        "store call failed (attempt {}/{}), retrying in {:?}: {}",
                        attempt, self.max_attempts, backoff, msg
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

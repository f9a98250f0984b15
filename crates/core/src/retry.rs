//! Retry with linearly growing delay
//!
//! # Example
//!
//! ```rust,no_run
//! use iweekly_core::retry::{request_with_retry, RetryPolicy};
//!
//! # async fn run() -> Result<(), std::io::Error> {
//! let body = request_with_retry(&RetryPolicy::default(), |attempt| async move {
//!     // Potentially flaky operation
//!     Ok::<_, std::io::Error>(format!("answered on attempt {attempt}"))
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failure; later delays grow by this amount
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy that runs the operation once
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Set the attempt count
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the base delay
    #[must_use]
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Delay before the attempt following failed attempt `attempt` (0-based)
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt.saturating_add(1))
    }
}

/// Run `f` until it succeeds or the policy runs out of attempts
///
/// `f` receives the 0-based attempt number. The error of the last attempt is
/// returned unchanged. A policy with zero attempts still runs `f` once.
pub async fn request_with_retry<T, E, F, Fut>(policy: &RetryPolicy, mut f: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match f(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempt = attempt + 1, "Retry succeeded");
                }
                return Ok(value);
            }
            Err(err) if attempt + 1 >= attempts => {
                warn!(attempt = attempt + 1, error = %err, "Giving up after final attempt");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(attempts: u32) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(attempts)
            .with_base_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_success_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = request_with_retry(&fast(3), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, &str>("success") }
        })
        .await;

        assert_eq!(result, Ok("success"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_after_two_failures() {
        let calls = AtomicU32::new(0);
        let result = request_with_retry(&fast(3), |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err("not yet")
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_returns_last_error() {
        let result = request_with_retry(&fast(2), |attempt| async move {
            Err::<(), _>(format!("failure {attempt}"))
        })
        .await;

        assert_eq!(result, Err("failure 1".to_string()));
    }

    #[tokio::test]
    async fn test_zero_attempts_runs_once() {
        let calls = AtomicU32::new(0);
        let _ = request_with_retry(&fast(0), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>("nope") }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sleep_after_last_attempt() {
        let start = tokio::time::Instant::now();
        let policy = RetryPolicy::default();
        let _ = request_with_retry(&policy, |_| async { Err::<(), _>("down") }).await;

        // 1s + 2s between three attempts, nothing after the third
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn test_delay_calculation() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(3));
    }
}

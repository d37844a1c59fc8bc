//! Retry logic with exponential backoff
//!
//! Provides retry mechanisms for flaky network operations:
//! - Exponential backoff capped at a maximum delay
//! - Configurable retry policies
//! - Attempt accounting for callers that need it
//!
//! Delays are awaited with `tokio::time::sleep`, so a paused tokio clock in
//! tests drives backoff deterministically.
//!
//! # Example
//!
//! ```rust,no_run
//! use workorder_core::retry::{retry_async, RetryConfig};
//!
//! # async fn demo() {
//! let result = retry_async(&RetryConfig::default(), |_attempt| async {
//!     // Potentially flaky operation
//!     Ok::<_, std::io::Error>("success")
//! })
//! .await;
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Deterministic doubling backoff: `initial_delay * 2^(attempt-1)`
    pub fn doubling(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::MAX,
            backoff_multiplier: 2.0,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let base_delay = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);

        let delay_secs = base_delay.min(self.max_delay.as_secs_f64());

        Duration::try_from_secs_f64(delay_secs).unwrap_or(self.max_delay)
    }
}

/// Retry result with attempt information
#[derive(Debug)]
pub struct RetryResult<T> {
    /// The successful result
    pub value: T,
    /// Number of attempts made
    pub attempts: u32,
    /// Total time spent, backoff included
    pub total_duration: Duration,
}

/// Returned when every attempt failed
#[derive(Debug)]
pub struct RetryError<E> {
    /// Error from the final attempt
    pub last_error: E,
    /// Number of attempts made
    pub attempts: u32,
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gave up after {} attempts: {}", self.attempts, self.last_error)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.last_error)
    }
}

/// Run `operation` until it succeeds or `config.max_attempts` is reached.
///
/// The closure receives the 1-based attempt number. Between attempts the task
/// sleeps for [`RetryConfig::delay_for_attempt`].
pub async fn retry_async<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
) -> Result<RetryResult<T>, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let start = Instant::now();
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                return Ok(RetryResult {
                    value,
                    attempts: attempt,
                    total_duration: start.elapsed(),
                });
            }
            Err(e) if attempt >= max_attempts => {
                return Err(RetryError {
                    last_error: e,
                    attempts: attempt,
                });
            }
            Err(e) => {
                let delay = config.delay_for_attempt(attempt);
                debug!(
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %e,
                    "Attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

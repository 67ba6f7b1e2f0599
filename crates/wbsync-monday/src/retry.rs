//! Exponential backoff retry logic.
//!
//! The policy is generic over the error type through [`Retryable`], so the
//! same backoff rules apply to single API calls and to whole per-record
//! pipelines in the reconcile crate.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::MondayClientError;

/// Classification an error must provide to be retried by [`RetryPolicy`].
pub trait Retryable: Display {
    /// Whether the failed operation may succeed if repeated.
    fn is_retryable(&self) -> bool;

    /// Server-provided delay hint in seconds, if any.
    fn retry_after_secs(&self) -> Option<u64> {
        None
    }
}

impl Retryable for MondayClientError {
    fn is_retryable(&self) -> bool {
        MondayClientError::is_retryable(self)
    }

    fn retry_after_secs(&self) -> Option<u64> {
        MondayClientError::retry_after_secs(self)
    }
}

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 = no retries).
    pub max_retries: u32,
    /// Base delay in seconds for exponential backoff.
    pub base_delay_secs: u64,
    /// Maximum delay cap in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_secs: 1,
            max_delay_secs: 60,
        }
    }
}

/// Outcome of [`RetryPolicy::execute`] when every attempt failed.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    /// Attempts made, including the first.
    pub attempts: u32,
    /// Error from the final attempt.
    pub last_error: E,
}

impl RetryPolicy {
    /// Create a new retry policy with the given max retries and base delay.
    /// The maximum delay cap defaults to 60 seconds.
    #[must_use]
    pub fn new(max_retries: u32, base_delay_secs: u64) -> Self {
        Self {
            max_retries,
            base_delay_secs,
            max_delay_secs: 60,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    /// Whether the error should be retried at the given attempt number.
    #[must_use]
    pub fn should_retry<E: Retryable>(&self, attempt: u32, error: &E) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }

    /// Calculate delay for the given attempt using exponential backoff.
    ///
    /// A server-provided retry hint is used directly (capped at
    /// `max_delay_secs`). Otherwise the delay is
    /// `min(base_delay_secs * 2^attempt, max_delay_secs)`.
    #[must_use]
    pub fn delay_for<E: Retryable>(&self, attempt: u32, error: &E) -> Duration {
        let secs = match error.retry_after_secs() {
            Some(hint) => hint.min(self.max_delay_secs),
            None => self
                .base_delay_secs
                .saturating_mul(2u64.saturating_pow(attempt))
                .min(self.max_delay_secs),
        };
        Duration::from_secs(secs)
    }

    /// Execute an async operation with retry.
    ///
    /// `f` is called until it succeeds, a non-retryable error is returned,
    /// or retries are exhausted. Non-retryable errors are returned on the
    /// first occurrence with `attempts` reflecting how many calls were made.
    pub async fn execute<F, Fut, T, E>(
        &self,
        operation_name: &str,
        f: F,
    ) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: Retryable,
    {
        self.execute_while(operation_name, || true, f).await
    }

    /// Like [`execute`](Self::execute), but gives up on retrying once
    /// `keep_going` returns false. It is checked before and after each
    /// backoff sleep; the last error is returned when it stops the loop.
    pub async fn execute_while<C, F, Fut, T, E>(
        &self,
        operation_name: &str,
        keep_going: C,
        mut f: F,
    ) -> Result<T, RetryExhausted<E>>
    where
        C: Fn() -> bool,
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: Retryable,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            operation = operation_name,
                            attempt = attempt + 1,
                            "Operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !self.should_retry(attempt, &error) {
                        if error.is_retryable() && attempt >= self.max_retries {
                            warn!(
                                operation = operation_name,
                                attempts = attempt + 1,
                                error = %error,
                                "Max retries exceeded"
                            );
                        }
                        return Err(RetryExhausted {
                            attempts: attempt + 1,
                            last_error: error,
                        });
                    }

                    if !keep_going() {
                        debug!(
                            operation = operation_name,
                            attempts = attempt + 1,
                            error = %error,
                            "Retry abandoned"
                        );
                        return Err(RetryExhausted {
                            attempts: attempt + 1,
                            last_error: error,
                        });
                    }

                    let delay = self.delay_for(attempt, &error);
                    debug!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_secs = delay.as_secs(),
                        error = %error,
                        "Retrying after transient error"
                    );

                    tokio::time::sleep(delay).await;
                    if !keep_going() {
                        return Err(RetryExhausted {
                            attempts: attempt + 1,
                            last_error: error,
                        });
                    }
                    attempt += 1;
                }
            }
        }
    }
}

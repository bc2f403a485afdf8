//! Bounded exponential-backoff retry for an eventually consistent backend.
//!
//! Writes to the OneProvider API are applied asynchronously, so a read
//! issued straight after a write may still return the old state. The helpers
//! here re-run an operation with growing pauses until it reports success,
//! fails permanently, runs out of attempts, or the caller cancels.
//!
//! Cancellation is observed only at attempt boundaries: a token cancelled
//! while the engine sleeps takes effect before the following attempt, never
//! mid-sleep.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Retry budget and backoff shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first.
    pub max_retries: u32,
    /// Pause before the second attempt.
    pub initial_delay: Duration,
    /// Ceiling applied to every pause.
    pub max_delay: Duration,
    /// Multiplier applied to the pause after each retry.
    pub backoff_factor: f64,
}

impl RetryConfig {
    /// Budget suited to waiting out the backend's propagation lag: 8
    /// attempts, 500 ms initial pause doubling up to 30 s.
    #[must_use]
    pub const fn eventual_consistency() -> Self {
        Self {
            max_retries: 8,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_factor: 2.0,
        }
    }

    /// Pause that follows `current` under this configuration.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "backoff factor is a fractional multiplier by definition"
    )]
    pub fn next_delay(&self, current: Duration) -> Duration {
        if !self.backoff_factor.is_finite() || self.backoff_factor <= 0.0 {
            return current.min(self.max_delay);
        }
        Duration::try_from_secs_f64(current.as_secs_f64() * self.backoff_factor)
            .map_or(self.max_delay, |next| next.min(self.max_delay))
    }

    /// Pauses inserted between consecutive attempts, in order.
    ///
    /// The iterator yields `max_retries - 1` values: no pause precedes the
    /// first attempt.
    #[must_use]
    pub fn delays(&self) -> Delays {
        Delays {
            config: *self,
            current: self.initial_delay,
            remaining: self.max_retries.saturating_sub(1),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::eventual_consistency()
    }
}

/// Iterator over the backoff schedule of a [`RetryConfig`].
#[derive(Clone, Debug)]
pub struct Delays {
    config: RetryConfig,
    current: Duration,
    remaining: u32,
}

impl Iterator for Delays {
    type Item = Duration;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let delay = self.current;
        self.current = self.config.next_delay(delay);
        Some(delay)
    }
}

/// Result of a single attempt.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Attempt<T, E> {
    /// The operation succeeded; stop and return the value.
    Done(T),
    /// The operation should run again. The error, when present, is only
    /// logged.
    Retry(Option<E>),
    /// The operation failed in a way retrying cannot fix; stop and return
    /// the error unchanged.
    Fail(E),
}

/// Errors returned by [`with_retry`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RetryError<E> {
    /// The cancellation token fired before an attempt started.
    #[error("operation cancelled before attempt {attempt}")]
    Cancelled {
        /// One-based attempt that was not started.
        attempt: u32,
    },
    /// Every attempt asked to be retried.
    #[error("operation failed after {attempts} attempts")]
    Exhausted {
        /// Number of attempts performed.
        attempts: u32,
        /// Error reported by the last attempt, if it reported one.
        last_error: Option<E>,
    },
    /// The operation reported a permanent failure.
    #[error(transparent)]
    Permanent(E),
}

impl<E> RetryError<E> {
    /// Returns the operation's own error for permanent failures.
    #[must_use]
    pub fn into_permanent(self) -> Option<E> {
        match self {
            Self::Permanent(err) => Some(err),
            Self::Cancelled { .. } | Self::Exhausted { .. } => None,
        }
    }
}

/// Runs `operation` until it returns [`Attempt::Done`] or [`Attempt::Fail`],
/// sleeping between attempts according to `config`.
///
/// The operation receives the zero-based attempt number.
///
/// # Errors
///
/// Returns [`RetryError::Cancelled`] when `cancel` fires before an attempt,
/// [`RetryError::Permanent`] carrying the operation's error unchanged, or
/// [`RetryError::Exhausted`] once `config.max_retries` attempts all asked to
/// retry.
pub async fn with_retry<T, E, F, Fut>(
    cancel: &CancellationToken,
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Attempt<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = config.initial_delay;
    let mut last_error = None;

    for attempt in 0..config.max_retries {
        if cancel.is_cancelled() {
            debug!(attempt = attempt + 1, "operation cancelled");
            return Err(RetryError::Cancelled {
                attempt: attempt + 1,
            });
        }

        if attempt > 0 {
            debug!(
                attempt = attempt + 1,
                max_attempts = config.max_retries,
                delay = ?delay,
                "retrying operation"
            );
            sleep(delay).await;
        }

        match operation(attempt).await {
            Attempt::Done(value) => {
                if attempt > 0 {
                    debug!(attempts = attempt + 1, "operation succeeded after retries");
                }
                return Ok(value);
            }
            Attempt::Fail(err) => {
                debug!(error = %err, "operation failed permanently");
                return Err(RetryError::Permanent(err));
            }
            Attempt::Retry(err) => {
                match &err {
                    Some(reason) => debug!(error = %reason, "operation failed, will retry"),
                    None => debug!("operation needs retry (validation failed)"),
                }
                last_error = err;
                delay = config.next_delay(delay);
            }
        }
    }

    Err(RetryError::Exhausted {
        attempts: config.max_retries,
        last_error,
    })
}

/// Re-reads until `is_valid` accepts the value.
///
/// Read errors are treated as transient and retried; a rejected value is
/// retried without an error.
///
/// # Errors
///
/// Returns [`RetryError::Cancelled`] or [`RetryError::Exhausted`]; a read
/// error never ends the loop early.
pub async fn with_retry_until_valid<T, E, F, Fut, P>(
    cancel: &CancellationToken,
    config: &RetryConfig,
    mut operation: F,
    is_valid: P,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&T) -> bool,
    E: std::fmt::Display,
{
    let accept = &is_valid;
    with_retry(cancel, config, move |_| {
        let read = operation();
        async move {
            match read.await {
                Ok(value) if accept(&value) => Attempt::Done(value),
                Ok(_) => Attempt::Retry(None),
                Err(err) => Attempt::Retry(Some(err)),
            }
        }
    })
    .await
}

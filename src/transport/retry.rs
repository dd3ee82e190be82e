//! Retry policy and the attempt loop that applies it.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::time::{Sleeper, TokioSleeper};

/// Configuration for exponential backoff with jitter.
///
/// # Defaults
///
/// - `max_attempts`: 3
/// - `initial_delay`: 500 milliseconds
/// - `max_delay`: 10 seconds
/// - `multiplier`: 2.0
/// - `jitter`: 0.1
///
/// # Example
///
/// ```
/// use callback_client::transport::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_max_attempts(5)
///     .with_initial_delay(Duration::from_millis(200))
///     .with_max_delay(Duration::from_secs(5))
///     .with_multiplier(1.5)
///     .with_jitter(0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    ///
    /// A value of 1 means no retries; only the initial attempt is made.
    pub max_attempts: u32,

    /// Delay before the first retry.
    pub initial_delay: Duration,

    /// Upper bound on any single delay, after jitter.
    pub max_delay: Duration,

    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,

    /// Fraction (0.0 to 1.0) by which each delay is randomly spread.
    ///
    /// With 0.2 a nominal 1s delay lands anywhere in 0.8s..=1.2s.
    pub jitter: f64,
}

impl RetryPolicy {
    /// Default maximum attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Default initial delay (500 milliseconds).
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

    /// Default maximum delay (10 seconds).
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

    /// Default multiplier (2.0).
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Default jitter (10%).
    pub const DEFAULT_JITTER: f64 = 0.1;

    /// Minimum value for `max_attempts`.
    pub const MIN_MAX_ATTEMPTS: u32 = 1;

    /// Creates a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
            jitter: Self::DEFAULT_JITTER,
        }
    }

    /// Sets the maximum number of attempts.
    ///
    /// # Panics
    ///
    /// Panics if `max_attempts` is less than 1.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        assert!(
            max_attempts >= Self::MIN_MAX_ATTEMPTS,
            "max_attempts must be at least 1"
        );
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the delay before the first retry.
    ///
    /// Zero is allowed, which makes retries back-to-back.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the delay multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `multiplier` is not positive (must be > 0.0).
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        assert!(multiplier > 0.0, "multiplier must be positive");
        self.multiplier = multiplier;
        self
    }

    /// Sets the jitter fraction.
    ///
    /// # Panics
    ///
    /// Panics if `jitter` is outside `0.0..=1.0`.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&jitter),
            "jitter must be between 0.0 and 1.0"
        );
        self.jitter = jitter;
        self
    }

    /// Computes the nominal delay for a given retry number (0-indexed),
    /// before jitter.
    ///
    /// The result is `initial_delay * multiplier^retry`, capped at `max_delay`.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        // Retry counts are tiny compared to i32::MAX
        #[allow(clippy::cast_possible_wrap)]
        let multiplier = self.multiplier.powi(retry as i32);
        let delay_secs = self.initial_delay.as_secs_f64() * multiplier;
        let capped = delay_secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Computes the delay for a retry with jitter applied.
    ///
    /// Never exceeds `max_delay`.
    #[must_use]
    pub fn backoff_for_retry(&self, retry: u32) -> Duration {
        let nominal = self.delay_for_retry(retry);
        if self.jitter <= 0.0 || nominal.is_zero() {
            return nominal;
        }

        let spread = rand::thread_rng().gen_range(-self.jitter..=self.jitter);
        nominal.mul_f64(1.0 + spread).min(self.max_delay)
    }

    /// Returns true if another attempt may follow attempt number `attempt`
    /// (1 = first attempt).
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies an error as transient or terminal.
///
/// [`Retrier`] stops immediately on errors for which this returns false.
pub trait IsRetryable {
    /// Returns true if repeating the same operation might succeed.
    fn is_retryable(&self) -> bool;
}

/// The caller's cancellation token fired before the operation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Operation cancelled")]
pub struct Cancelled;

/// Runs an operation repeatedly under a [`RetryPolicy`].
///
/// Each attempt and each backoff sleep races the caller's
/// [`CancellationToken`]; cancellation wins and ends the loop with
/// [`Cancelled`]. When attempts run out, the error from the final attempt is
/// returned unchanged.
///
/// # Type Parameters
///
/// - `S`: The sleeper used between attempts (defaults to [`TokioSleeper`])
#[derive(Debug, Clone)]
pub struct Retrier<S = TokioSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl Retrier<TokioSleeper> {
    /// Creates a retrier that sleeps on the Tokio timer.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: TokioSleeper,
        }
    }
}

impl<S> Retrier<S> {
    /// Replaces the sleeper used between attempts.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> Retrier<S2> {
        Retrier {
            policy: self.policy,
            sleeper,
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<S: Sleeper> Retrier<S> {
    /// Runs `operation` until it succeeds, fails terminally, runs out of
    /// attempts, or `cancel` fires.
    ///
    /// An already-cancelled token prevents the first attempt.
    ///
    /// # Errors
    ///
    /// - The first non-retryable error, as returned by `operation`
    /// - The final attempt's error once the policy is exhausted
    /// - `E::from(Cancelled)` if the token fires first
    pub async fn run<T, E, F, Fut>(&self, cancel: &CancellationToken, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: IsRetryable + From<Cancelled> + fmt::Display,
    {
        if cancel.is_cancelled() {
            return Err(Cancelled.into());
        }

        let mut attempt = 1;
        loop {
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Cancelled.into()),
                outcome = operation() => outcome,
            };

            let error = match outcome {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_retryable() {
                return Err(error);
            }

            if !self.policy.should_retry(attempt) {
                tracing::warn!(attempts = attempt, %error, "Retries exhausted");
                return Err(error);
            }

            let delay = self.policy.backoff_for_retry(attempt - 1);
            tracing::debug!(
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                %error,
                "Attempt failed, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Cancelled.into()),
                () = self.sleeper.sleep(delay) => {}
            }

            attempt += 1;
        }
    }
}

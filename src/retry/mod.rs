//! Bounded, backing-off retry over fallible async operations
//!
//! [`RetryPolicy`] pairs an operation with a failure classifier: transient
//! failures sleep the configured backoff and re-run, fatal failures
//! short-circuit immediately, and an exhausted budget surfaces as a single
//! [`Error::RetryExhausted`](crate::Error::RetryExhausted). Every attempt
//! is individually observable; the caller only ever sees one outcome.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Backoff growth between retry attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

/// Classification of a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Expected to self-resolve; retry after backoff
    Transient,
    /// Retrying cannot help; short-circuit
    Fatal,
}

/// Classifier that follows the error's own transient/fatal taxonomy.
///
/// Callers with context the error lacks (e.g. "this extraction failure is
/// on the schema-establishing page") pass their own classifier instead.
pub fn default_classify(error: &Error) -> FailureClass {
    if error.is_transient() {
        FailureClass::Transient
    } else {
        FailureClass::Fatal
    }
}

/// A fallible operation that can be re-attempted.
///
/// Implementors hold whatever borrows a single attempt needs (typically
/// the rendering session); the policy re-invokes [`attempt`] until it
/// succeeds, fails fatally, or the budget runs out.
///
/// [`attempt`]: RetryableOp::attempt
#[async_trait]
pub trait RetryableOp: Send {
    /// Value produced by a successful attempt
    type Output: Send;

    /// Run one attempt
    async fn attempt(&mut self) -> Result<Self::Output>;
}

/// Retry configuration: attempt budget and backoff schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempt budget (first try included)
    pub max_attempts: u32,
    /// Backoff growth type
    #[serde(default)]
    pub backoff: BackoffType,
    /// Initial delay between attempts, in milliseconds
    pub initial_delay_ms: u64,
    /// Upper bound on any single delay, in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffType::Exponential,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and default backoff
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    /// Set the backoff type
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffType) -> Self {
        self.backoff = backoff;
        self
    }

    /// Set the initial delay
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the maximum delay
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Delay before re-running after the given zero-based failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let initial = Duration::from_millis(self.initial_delay_ms);
        let delay = match self.backoff {
            BackoffType::Constant => initial,
            BackoffType::Linear => initial * (attempt + 1),
            BackoffType::Exponential => initial * 2u32.saturating_pow(attempt),
        };
        std::cmp::min(delay, Duration::from_millis(self.max_delay_ms))
    }

    /// Run `op` under this policy.
    ///
    /// Returns the operation's success value, the first fatal error, or
    /// [`Error::RetryExhausted`](crate::Error::RetryExhausted) once the
    /// budget is spent.
    pub async fn execute<O, C>(&self, what: &str, classify: C, op: &mut O) -> Result<O::Output>
    where
        O: RetryableOp,
        C: Fn(&Error) -> FailureClass + Send,
    {
        self.execute_observed(what, classify, |_, _| {}, op).await
    }

    /// Like [`execute`](Self::execute), additionally invoking `on_retry`
    /// with the failed attempt number and its error before each re-run.
    pub async fn execute_observed<O, C, R>(
        &self,
        what: &str,
        classify: C,
        mut on_retry: R,
        op: &mut O,
    ) -> Result<O::Output>
    where
        O: RetryableOp,
        C: Fn(&Error) -> FailureClass + Send,
        R: FnMut(u32, &Error) + Send,
    {
        let mut attempt: u32 = 1;
        loop {
            match op.attempt().await {
                Ok(value) => return Ok(value),
                Err(error) => match classify(&error) {
                    FailureClass::Fatal => {
                        warn!(what, attempt, %error, "fatal failure, not retrying");
                        return Err(error);
                    }
                    FailureClass::Transient if attempt >= self.max_attempts => {
                        warn!(
                            what,
                            attempt,
                            max_attempts = self.max_attempts,
                            %error,
                            "retry budget exhausted"
                        );
                        return Err(Error::retry_exhausted(self.max_attempts, &error));
                    }
                    FailureClass::Transient => {
                        let delay = self.delay_for(attempt - 1);
                        warn!(
                            what,
                            attempt,
                            max_attempts = self.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            %error,
                            "transient failure, retrying"
                        );
                        on_retry(attempt, &error);
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                },
            }
        }
    }
}

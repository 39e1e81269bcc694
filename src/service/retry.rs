//! Bounded retry with backoff, shared by every report cycle.

use crate::domain::error::PositionError;
use crate::domain::settings::{Backoff, RetrySettings};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Details of a failed attempt that is about to be retried.
#[derive(Debug)]
pub struct RetryAttempt<'a> {
    pub operation: &'a str,
    /// 1-based retry number.
    pub attempt: u32,
    pub delay: Duration,
    pub error: &'a PositionError,
}

pub type RetryCallback = Arc<dyn Fn(&RetryAttempt<'_>) + Send + Sync>;

/// Runs an operation up to `max_retry_attempts + 1` times, sleeping between
/// attempts. The last failure is returned to the caller.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retry_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    backoff: Backoff,
    on_retry: Option<RetryCallback>,
}

impl RetryPolicy {
    pub fn new(settings: &RetrySettings) -> Self {
        Self {
            max_retry_attempts: settings.max_retry_attempts,
            base_delay: settings.initial_delay,
            max_delay: settings.max_delay,
            backoff: settings.backoff,
            on_retry: None,
        }
    }

    /// A policy that makes a single attempt.
    pub fn none() -> Self {
        Self::new(&RetrySettings {
            max_retry_attempts: 0,
            ..RetrySettings::default()
        })
    }

    pub fn with_on_retry(mut self, callback: RetryCallback) -> Self {
        self.on_retry = Some(callback);
        self
    }

    pub fn max_retry_attempts(&self) -> u32 {
        self.max_retry_attempts
    }

    /// Delay before the given 1-based retry, capped at the maximum delay.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = match self.backoff {
            Backoff::Constant => 1,
            Backoff::Linear => attempt.max(1),
            Backoff::Exponential => 1u32
                .checked_shl(attempt.saturating_sub(1))
                .unwrap_or(u32::MAX),
        };
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    pub async fn execute<T, F, Fut>(&self, operation: &str, mut action: F) -> Result<T, PositionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, PositionError>>,
    {
        let mut attempt = 0;
        loop {
            match action().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_retry_attempts => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay_millis(delay),
                        error = %error,
                        "retrying after failure"
                    );
                    if let Some(callback) = &self.on_retry {
                        callback(&RetryAttempt {
                            operation,
                            attempt,
                            delay,
                            error: &error,
                        });
                    }
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

fn delay_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

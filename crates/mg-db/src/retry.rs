//! Bounded exponential backoff for transient database errors

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Upper bound on retries after the first attempt
pub const MAX_RETRIES: u32 = 7;
/// Smallest initial delay
pub const MIN_DELAY: Duration = Duration::from_millis(100);
/// Largest initial delay
pub const MAX_DELAY: Duration = Duration::from_millis(3000);

/// How many times to retry and how long to wait first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    retries: u32,
    initial_delay: Duration,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl RetryPolicy {
    /// Clamp `retry_count` to `[0, 7]` and `retry_delay_ms` to `[100, 3000]`.
    pub fn new(retry_count: i64, retry_delay_ms: i64) -> Self {
        let retries = retry_count.clamp(0, i64::from(MAX_RETRIES)) as u32;
        let delay_ms = retry_delay_ms.clamp(
            MIN_DELAY.as_millis() as i64,
            MAX_DELAY.as_millis() as i64,
        );
        Self {
            retries,
            initial_delay: Duration::from_millis(delay_ms as u64),
            jitter: false,
        }
    }

    /// Add up to 25% random jitter to every wait.
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    fn wait_for(&self, delay: Duration) -> Duration {
        if !self.jitter {
            return delay;
        }
        let max_extra = delay.as_millis() as u64 / 4;
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..=max_extra))
    }
}

/// Run `op`, retrying transient failures with doubling delays.
///
/// Non-transient errors return at once. Cancellation is checked before each
/// attempt and aborts any pending wait.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    operation: &str,
    mut op: F,
) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 0;
    loop {
        if cancel.is_cancelled() {
            return Err(DbError::Cancelled);
        }

        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_transient() => return Err(e),
            Err(e) => e,
        };

        if policy.retries == 0 {
            return Err(err);
        }
        if attempt >= policy.retries {
            return Err(DbError::RetriesExhausted {
                retries: policy.retries,
                source: Box::new(err),
            });
        }

        attempt += 1;
        let wait = policy.wait_for(delay);
        log::warn!(
            "Transient error during {operation}: {err}. Retrying in {wait:?} (attempt {attempt}/{})",
            policy.retries
        );
        tokio::select! {
            _ = cancel.cancelled() => return Err(DbError::Cancelled),
            _ = tokio::time::sleep(wait) => {}
        }
        delay = delay.saturating_mul(2);
    }
}

/// Ping `db`, retrying transient failures per `policy`.
pub async fn ping_with_retry(
    db: &dyn Database,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
) -> DbResult<()> {
    with_retry(policy, cancel, "ping", || db.ping()).await
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;

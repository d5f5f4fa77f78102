//! Bounded-retry policy for remote reads.
//!
//! The policy is an explicit value (max attempts, fixed backoff) consumed by
//! a generic combinator, rather than a sleep loop buried inside the caller.
//! Tests drive it under tokio's paused clock, so the backoff is observable
//! without real waiting.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use cura_contracts::error::CuraResult;

/// How many times to attempt a remote read and how long to wait between
/// attempts. The delay is fixed, not exponential — total worst-case latency
/// stays bounded at `max_attempts × request-timeout + (max_attempts − 1) × backoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Must be at least 1.
    pub max_attempts: u32,
    /// Fixed delay between consecutive attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    /// 3 attempts with a 2-second backoff between them.
    fn default() -> Self {
        Self { max_attempts: 3, backoff: Duration::from_secs(2) }
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` is exhausted.
///
/// Every failed attempt is logged with the attempt number; the final
/// attempt's error is returned unchanged. `what` names the operation in
/// log output.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> CuraResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = CuraResult<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_attempt = 1;

    loop {
        match op().await {
            Ok(value) => {
                if last_attempt > 1 {
                    debug!(operation = what, attempt = last_attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if last_attempt < attempts => {
                warn!(
                    operation = what,
                    attempt = last_attempt,
                    max_attempts = attempts,
                    error = %e,
                    "attempt failed, backing off"
                );
                tokio::time::sleep(policy.backoff).await;
                last_attempt += 1;
            }
            Err(e) => {
                warn!(
                    operation = what,
                    attempts = attempts,
                    error = %e,
                    "all attempts exhausted"
                );
                return Err(e);
            }
        }
    }
}

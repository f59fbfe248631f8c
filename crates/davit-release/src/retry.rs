#![forbid(unsafe_code)]

//! Attempt-based retry with growing backoff.
//!
//! Any failure consumes an attempt; retryable-vs-fatal classification is the
//! transport decorator's concern, one layer below.

use std::{cmp::min, future::Future, time::Duration};

use tokio::time::sleep;

/// Retry budget for one fallible async unit of work.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Backoff growth factor per attempt.
    pub factor: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            factor: 3,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, factor: u32, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            factor,
            max_delay,
        }
    }

    /// Delay before the attempt following failed attempt `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let grown = self
            .base_delay
            .saturating_mul(self.factor.saturating_pow(attempt.saturating_sub(1)));
        min(grown, self.max_delay)
    }
}

/// Runs `op` until it succeeds or the attempt budget is spent, invoking
/// `on_failed_attempt(attempt, target)` on every failure and sleeping the
/// policy's delay between attempts. The last error propagates unchanged.
pub async fn retry_with_policy<T, E, F, Fut>(
    policy: &RetryPolicy,
    target: &str,
    mut on_failed_attempt: impl FnMut(u32, &str),
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                on_failed_attempt(attempt, target);
                if attempt >= max_attempts {
                    return Err(error);
                }
                sleep(policy.delay_for_attempt(attempt)).await;
            }
        }
    }
}

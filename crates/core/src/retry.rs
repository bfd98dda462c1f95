// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retries with random jitter between attempts

use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Runs an operation a bounded number of times.
///
/// Between attempts it sleeps for a uniformly random duration in
/// `[0, max_delay)` so competing clients do not retry in lockstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    count: u32,
    max_delay: Duration,
}

impl RetryPolicy {
    /// A `count` of zero is treated as one attempt.
    pub fn new(count: u32, max_delay: Duration) -> Self {
        Self {
            count: count.max(1),
            max_delay,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Call `op` with the 1-based attempt number until it returns `Ok` or
    /// the attempts run out. Returns the last error on exhaustion.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.count => return Err(e),
                Err(_) => {
                    let delay = self.jitter();
                    tracing::trace!(attempt, delay_ms = delay.as_millis() as u64, "retrying");
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Random delay in `[0, max_delay)`
    pub fn jitter(&self) -> Duration {
        let max_micros = self.max_delay.as_micros().min(u64::MAX as u128) as u64;
        if max_micros == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(rand::rng().random_range(0..max_micros))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200))
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;

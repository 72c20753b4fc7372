//! Bounded polling for resources that pass through transitional states.
//!
//! Lifecycle calls return before the canary settles; [`await_convergence`]
//! re-reads the resource at a fixed interval until it leaves its
//! transitional state or the timeout elapses.

use crate::error::CanaryError;
use anyhow::Result;
use backon::{BackoffBuilder, ConstantBuilder};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Interval and overall bound for polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between reads
    pub interval: Duration,
    /// Maximum total time to wait before giving up
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(15 * 60),
        }
    }
}

/// Poll `fetch` until `is_transitional` returns false for the value read.
///
/// The first read happens immediately. A read error ends the wait and is
/// returned as is. When the timeout elapses while the value is still
/// transitional, fails with [`CanaryError::TimeoutExceeded`].
pub async fn await_convergence<T, F, Fut, P>(
    config: &PollConfig,
    resource: &str,
    mut fetch: F,
    is_transitional: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> bool,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    // Unbounded: the elapsed-time check below ends the wait.
    let mut delays = ConstantBuilder::default()
        .with_delay(config.interval)
        .without_max_times()
        .build();

    loop {
        attempts += 1;

        let value = match fetch().await {
            Ok(value) => value,
            Err(e) => {
                warn!(resource = %resource, error = ?e, "Read failed while waiting");
                return Err(e);
            }
        };

        if !is_transitional(&value) {
            debug!(resource = %resource, attempts, "Resource settled");
            return Ok(value);
        }

        let waited = start.elapsed();
        if waited >= config.timeout {
            return Err(CanaryError::TimeoutExceeded {
                resource: resource.to_string(),
                waited,
                attempts,
            }
            .into());
        }

        let delay = delays.next().unwrap_or(config.interval);
        debug!(
            resource = %resource,
            attempt = attempts,
            delay_ms = delay.as_millis(),
            "Resource still transitional, polling again"
        );
        tokio::time::sleep(delay).await;
    }
}

//! Retry utilities: backoff builders for ledger writes.
//!
//! Uses `backon` for exponential backoff with jitter. Ledger writes that lose
//! a race with a concurrent writer are retried with [`ledger_backoff`].

use std::time::Duration;

use backon::ExponentialBuilder;

use crate::config::RetryConfig;

/// Backoff for ledger writes that hit a write conflict.
///
/// Delays and attempt count come from `RetryConfig`; jitter is always on so
/// that racing writers do not retry in lockstep.
pub fn ledger_backoff(config: &RetryConfig) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(config.min_delay_ms))
        .with_max_delay(Duration::from_millis(config.max_delay_ms))
        .with_max_times(config.max_times)
        .with_jitter()
}

//! Exponential backoff retry for operations that fail on optimistic-concurrency conflicts.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::warn;

const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Retry an async operation with exponential backoff.
///
/// `attempt` runs once, then up to `extra_attempts` more times while
/// `should_retry` accepts the error. The last error is returned unchanged.
/// With `extra_attempts == 0` this is a plain single call.
pub async fn retry_with_backoff<T, E, Fut, F, P>(
    extra_attempts: u32,
    mut attempt: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut retries_left = extra_attempts;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if retries_left > 0 && should_retry(&e) => {
                retries_left -= 1;
                let wait = backoff
                    .next_backoff()
                    .unwrap_or(Duration::from_secs(MAX_INTERVAL_SECS));
                warn!("{e}; retrying in {:?} ({retries_left} retries left)", wait);
                tokio::time::sleep(wait).await;
            }
            Err(e) => return Err(e),
        }
    }
}

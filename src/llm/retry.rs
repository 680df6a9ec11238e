//! Exponential backoff retry for completion calls.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use tracing::debug;

const INITIAL_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

/// Retry an async operation with exponential backoff.
///
/// `attempt` is called up to `max_attempts` times (at least once). With a
/// single attempt the error is returned unchanged. Otherwise the last error
/// is passed to `wrap_exhausted` together with the number of attempts made.
pub async fn retry_with_backoff<T, E, Fut, F, W>(
    max_attempts: u32,
    mut attempt: F,
    wrap_exhausted: W,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    W: FnOnce(u32, E) -> E,
{
    let max_attempts = max_attempts.max(1);
    let mut backoff = ExponentialBackoff {
        initial_interval: Duration::from_secs(INITIAL_INTERVAL_SECS),
        max_interval: Duration::from_secs(MAX_INTERVAL_SECS),
        max_elapsed_time: None,
        ..Default::default()
    };

    let mut attempts = 0;
    loop {
        attempts += 1;

        let err = match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if attempts >= max_attempts {
            return if max_attempts == 1 {
                Err(err)
            } else {
                Err(wrap_exhausted(attempts, err))
            };
        }

        if let Some(wait) = backoff.next_backoff() {
            debug!("Attempt {} failed, retrying in {:?}", attempts, wait);
            tokio::time::sleep(wait).await;
        }
    }
}

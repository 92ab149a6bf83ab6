//! Bounded exponential-backoff retry
//!
//! Wraps any fallible async operation. Every failure is treated as
//! retryable; once the retry budget is spent the last error is returned
//! unchanged.

use crate::constants::RETRY_JITTER_MAX_MS;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Delay before retry number `attempt + 1`: `base * 2^attempt + jitter`
pub fn backoff_delay(base_delay: Duration, attempt: u32) -> Duration {
    let jitter_ms = rand::random::<f64>() * RETRY_JITTER_MAX_MS;
    base_delay
        .saturating_mul(2u32.saturating_pow(attempt))
        .saturating_add(Duration::from_secs_f64(jitter_ms / 1000.0))
}

/// Run `operation` until it succeeds or `max_retries` retries have failed
///
/// Issues at most `max_retries + 1` calls.
pub async fn with_retry<T, E, F, Fut>(
    mut operation: F,
    max_retries: u32,
    base_delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= max_retries {
                    return Err(e);
                }
                let delay = backoff_delay(base_delay, attempt);
                warn!(
                    attempt = attempt + 1,
                    max_retries = max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Operation failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

//! Retry policy for storefront requests.
//!
//! Transient failures (timeouts, connection errors, 5xx, 429) are retried with
//! exponential backoff. Everything else, including 404 and other 4xx
//! statuses, is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Returns `true` if `err` represents a transient condition that should be
/// retried after a backoff delay.
///
/// Retriable:
/// - [`ScraperError::RateLimited`]: HTTP 429.
/// - [`ScraperError::UnexpectedStatus`] with a 5xx status.
/// - [`ScraperError::Http`]: network-level failure, except request-builder
///   errors which would fail identically on every attempt.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::Http(e) => !e.is_builder(),
        _ => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps `backoff_base_ms * 2^attempt`
/// milliseconds (attempt starting at 0) and tries again, up to `max_retries`
/// additional attempts after the first try. Once retries are exhausted the
/// last error is folded into [`ScraperError::RetriesExhausted`] carrying the
/// total attempt count.
///
/// Non-retriable errors are returned unchanged without sleeping.
///
/// | Attempt | Sleep before next attempt (base = 1000 ms) |
/// |---------|--------------------------------------------|
/// | 0 (initial) | 1000 ms × 2^0 = 1 s |
/// | 1 (first retry) | 1000 ms × 2^1 = 2 s |
/// | 2 (second retry) | 1000 ms × 2^2 = 4 s |
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    url: &str,
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !is_retriable(&err) {
            return Err(err);
        }
        if attempt >= max_retries {
            return Err(ScraperError::RetriesExhausted {
                url: url.to_owned(),
                reason: err.to_string(),
                attempts: attempt + 1,
            });
        }

        // Cap the shift so extreme configs saturate instead of overflowing.
        let delay_ms = backoff_base_ms.saturating_mul(1u64 << attempt.min(20));
        tracing::warn!(
            url,
            attempt,
            max_retries,
            delay_ms,
            error = %err,
            "transient fetch error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        attempt += 1;
    }
}

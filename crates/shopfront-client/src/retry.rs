//! Retry with exponential back-off and jitter for the storefront client.
//!
//! The client is constructed with `max_retries = 0` unless configured
//! otherwise. [`retry_with_backoff`] only retries transport timeouts,
//! connection failures and 5xx statuses; everything else is returned
//! immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connect failures, HTTP 5xx.
///
/// **Not retriable:** 4xx statuses, decode failures, invalid input.
pub(crate) fn is_retriable(err: &ClientError) -> bool {
    match err {
        ClientError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ClientError::Status { status } => (500..600).contains(status),
        ClientError::Deserialize { .. }
        | ClientError::Serialize { .. }
        | ClientError::InvalidBaseUrl { .. }
        | ClientError::InvalidQuantity { .. } => false,
    }
}

/// Delay before retry number `attempt` (1-based), before jitter.
fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32) -> u64 {
    backoff_base_ms
        .saturating_mul(1u64 << (attempt.saturating_sub(1)).min(10))
        .min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// Back-off schedule with `backoff_base_ms = 500`:
///
/// | Retry | Sleep before it             |
/// |-------|-----------------------------|
/// | 1     | 500 ms × 2⁰ ± 25 % jitter   |
/// | 2     | 500 ms × 2¹ ± 25 % jitter   |
/// | 3     | 500 ms × 2² ± 25 % jitter   |
///
/// Delay is capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let capped = backoff_delay_ms(backoff_base_ms, attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "storefront request failed: retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

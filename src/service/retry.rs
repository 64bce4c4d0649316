// Retry logic with exponential backoff

use std::time::Duration;
use tokio::time::sleep;

use crate::errors::ServiceError;

const BASE_DELAY_MS: u64 = 500;

/// Run `f` up to `max_attempts` times, backing off between attempts.
/// Only transient errors (transport failures, 5xx) are retried.
pub async fn with_retry<F, Fut, T>(max_attempts: u32, f: F) -> Result<T, ServiceError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, ServiceError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_transient() && attempt + 1 < max_attempts => {
                let delay = Duration::from_millis(BASE_DELAY_MS * 2u64.pow(attempt));
                tracing::warn!(
                    "Request failed (attempt {}/{}): {}; retrying in {:?}",
                    attempt + 1,
                    max_attempts,
                    e,
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

//! Back-off for supplier rate limiting.
//!
//! Only [`SupplierError::RateLimited`] is retried. Every other failure is
//! returned immediately; the synchronizer's next scheduled run is the retry
//! mechanism for those.

use std::future::Future;
use std::time::Duration;

use crate::error::SupplierError;

pub(crate) fn is_retriable(err: &SupplierError) -> bool {
    matches!(err, SupplierError::RateLimited { .. })
}

/// Runs `operation` with up to `max_retries` additional attempts on HTTP 429.
///
/// The n-th retry waits `backoff_base_secs * 2^(n-1)` seconds ± 25 % jitter,
/// never less than the supplier's `Retry-After` and capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, SupplierError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SupplierError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let base_ms = backoff_base_secs.saturating_mul(1_000);
                let computed = base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (computed as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let floor_ms = match &err {
                    SupplierError::RateLimited { retry_after_secs } if base_ms > 0 => {
                        retry_after_secs.saturating_mul(1_000)
                    }
                    _ => 0,
                };
                let delay_ms = jittered.max(floor_ms).min(MAX_DELAY_MS);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "supplier rate limit hit, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn rate_limited() -> SupplierError {
        SupplierError::RateLimited {
            retry_after_secs: 30,
        }
    }

    #[test]
    fn only_rate_limit_is_retriable() {
        assert!(is_retriable(&rate_limited()));
        assert!(!is_retriable(&SupplierError::Api {
            code: 1_600_200,
            message: "bad".to_owned()
        }));
        assert!(!is_retriable(&SupplierError::UnexpectedStatus {
            status: 503,
            url: "http://x".to_owned()
        }));
    }

    #[tokio::test]
    async fn retries_rate_limit_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        // base 0 disables both the back-off and the Retry-After floor.
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(rate_limited())
                } else {
                    Ok(7u32)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(rate_limited())
            }
        })
        .await;
        assert!(matches!(result, Err(SupplierError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_api_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(SupplierError::Api {
                    code: 500,
                    message: "boom".to_owned(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(SupplierError::Api { code: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

//! Bounded retry with jittered backoff for transient store failures

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::constants::{
    STORE_RETRY_ATTEMPTS, STORE_RETRY_BASE_DELAY_MS, STORE_RETRY_MAX_DELAY_MS,
};
use crate::error::{AppError, AppResult};

/// Run `op`, retrying on `TransientStore` errors with exponential backoff
/// and jitter. All other errors propagate immediately. Safe only for
/// operations that are atomic on the store side; a retry must never re-enter
/// a transaction that has partially committed.
pub async fn retry_transient<T, F, Fut>(op_name: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut delay_ms = STORE_RETRY_BASE_DELAY_MS;

    for attempt in 1..=STORE_RETRY_ATTEMPTS {
        match op().await {
            Err(AppError::TransientStore(reason)) if attempt < STORE_RETRY_ATTEMPTS => {
                warn!(
                    operation = op_name,
                    attempt,
                    reason = %reason,
                    "Transient store failure, retrying"
                );
                let jitter = rand::rng().random_range(0..=delay_ms / 2);
                tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                delay_ms = (delay_ms * 2).min(STORE_RETRY_MAX_DELAY_MS);
            }
            other => return other,
        }
    }

    unreachable!("retry loop always returns on the final attempt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_transient("test_op", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(AppError::TransientStore("pool exhausted".into()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_transient("test_op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::TransientStore("still down".into())) }
        })
        .await;

        assert!(matches!(result, Err(AppError::TransientStore(_))));
        assert_eq!(calls.load(Ordering::SeqCst), STORE_RETRY_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_non_transient_errors_propagate_immediately() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_transient("test_op", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::NotFound("gone".into())) }
        })
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

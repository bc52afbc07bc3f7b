//! Bounded exponential-backoff retry around provider fetches.
//!
//! The attempt ceiling and delays come from [`RetryConfig`]; nothing here is
//! hard-coded. Exhausting the budget surfaces
//! [`ProviderError::SourceUnavailable`] rather than a partial batch, which is
//! what triggers the last-known-good fallback upstream.

use std::future::Future;
use std::time::Duration;

use grid_config::RetryConfig;

use crate::error::ProviderError;

/// Run `op` until it succeeds, fails terminally, or the attempt ceiling is
/// reached. Rate-limit responses extend the backoff to honor `Retry-After`.
///
/// # Errors
///
/// Terminal errors propagate unchanged; exhausted transient errors become
/// [`ProviderError::SourceUnavailable`].
pub async fn with_retries<T, F, Fut>(
    retry: &RetryConfig,
    source: &str,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = retry.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                tracing::warn!(source, attempt, error = %e, "transient fetch failure");
                let mut delay = retry.delay_after(attempt);
                if let ProviderError::RateLimited { retry_after_secs } = &e {
                    delay = delay.max(Duration::from_secs(*retry_after_secs));
                }
                last_error = e.to_string();
                if attempt < max_attempts {
                    tokio::time::sleep(delay).await;
                }
            }
            Err(e) => return Err(e),
        }
    }

    Err(ProviderError::SourceUnavailable {
        source_name: source.to_string(),
        attempts: max_attempts,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            base_delay_ms: 1,
            max_delay_ms: 2,
        }
    }

    #[tokio::test]
    async fn succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = with_retries(&fast_retry(3), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ProviderError>(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_until_ceiling() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), _> = with_retries(&fast_retry(3), "sourceB", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Api {
                status: 503,
                message: "down".to_string(),
            })
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3, "retry ceiling honored exactly");
        match result.unwrap_err() {
            ProviderError::SourceUnavailable {
                source_name,
                attempts,
                last_error,
            } => {
                assert_eq!(source_name, "sourceB");
                assert_eq!(attempts, 3);
                assert!(last_error.contains("503"));
            }
            other => panic!("expected SourceUnavailable, got {other}"),
        }
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result = with_retries(&fast_retry(3), "test", || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(ProviderError::Api {
                    status: 502,
                    message: String::new(),
                })
            } else {
                Ok("ok")
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn terminal_errors_do_not_retry() {
        let calls = AtomicU32::new(0);
        let calls = &calls;
        let result: Result<(), _> = with_retries(&fast_retry(3), "test", || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Parse("bad body".to_string()))
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), ProviderError::Parse(_)));
    }
}

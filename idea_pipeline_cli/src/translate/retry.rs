use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use crate::error::{TranslateError, TranslateResult};

/// How a single translation call is retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
    /// Extra factor applied to the delay after a 429.
    pub rate_limit_multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
            rate_limit_multiplier: 3.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_multiplier(self.multiplier)
            .with_randomization_factor(0.0)
            .with_max_interval(self.max_delay)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Delay before retry number `retry` (0-based) of a normal transient failure.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let mut backoff = self.backoff();
        (0..=retry)
            .filter_map(|_| backoff.next_backoff())
            .last()
            .unwrap_or(self.max_delay)
    }

    fn rate_limited_delay(&self, retry: u32) -> Duration {
        self.delay_for(retry).mul_f64(self.rate_limit_multiplier)
    }
}

/// Runs `call` until it succeeds, fails permanently, or runs out of retries.
///
/// Non-retryable errors (auth, unsupported language, rejected input) are
/// returned after the first attempt.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut call: F) -> TranslateResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = TranslateResult<T>>,
{
    let attempts = AtomicU32::new(0);
    let max_retries = policy.max_retries;

    let operation = || {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        let pending = call();
        async move {
            match pending.await {
                Ok(value) => Ok(value),
                Err(err) if !err.is_retryable() || attempt >= max_retries => {
                    Err(backoff::Error::permanent(err))
                }
                Err(TranslateError::RateLimited) => Err(backoff::Error::retry_after(
                    TranslateError::RateLimited,
                    policy.rate_limited_delay(attempt),
                )),
                Err(err) => Err(backoff::Error::transient(err)),
            }
        }
    };

    backoff::future::retry_notify(policy.backoff(), operation, |err: TranslateError, delay: Duration| {
        tracing::warn!(error = %err, ?delay, "translation call failed, retrying");
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn fast() -> RetryPolicy {
        RetryPolicy::default().with_initial_delay(Duration::from_millis(1))
    }

    #[test]
    fn delays_double() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.rate_limited_delay(0), Duration::from_secs(3));
    }

    #[test]
    fn delays_are_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(10), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let calls = AtomicUsize::new(0);
        let result = with_retry(&fast(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(TranslateError::Server { status: 503, message: "busy".into() })
                } else {
                    Ok("안녕")
                }
            }
        })
        .await;
        assert_eq!(result, Ok("안녕"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = AtomicUsize::new(0);
        let result: TranslateResult<()> = with_retry(&fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TranslateError::Network("connection reset".into())) }
        })
        .await;
        assert!(matches!(result, Err(TranslateError::Network(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn rate_limit_is_retried() {
        let calls = AtomicUsize::new(0);
        let result = with_retry(&fast(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(TranslateError::RateLimited)
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(1));
    }

    #[tokio::test]
    async fn auth_failure_is_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: TranslateResult<()> = with_retry(&fast(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TranslateError::Auth("invalid api key".into())) }
        })
        .await;
        assert!(matches!(result, Err(TranslateError::Auth(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

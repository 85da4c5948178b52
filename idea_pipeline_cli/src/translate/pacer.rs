use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// Spaces outgoing translation calls at least `interval` apart.
///
/// Burst is one, so the first call goes out immediately and each later
/// call waits for the next slot.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl RequestPacer {
    pub fn every(interval: Duration) -> Self {
        let limiter = Quota::with_period(interval)
            .map(|quota| Arc::new(RateLimiter::direct(quota.allow_burst(NonZeroU32::MIN))));
        Self { limiter }
    }

    pub fn unlimited() -> Self {
        Self { limiter: None }
    }

    pub async fn wait(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer")
            .field("limited", &self.limiter.is_some())
            .finish()
    }
}

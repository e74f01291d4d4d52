use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Paces upstream page requests so consecutive refreshes stay polite.
#[derive(Clone)]
pub struct PageThrottle {
    limiter: Arc<DirectRateLimiter>,
}

impl PageThrottle {
    /// Allows `pages_per_second` requests per second with an equal burst.
    pub fn per_second(pages_per_second: u32) -> Self {
        let limit = NonZeroU32::new(pages_per_second.max(1)).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(limit))),
        }
    }

    /// Non-blocking budget check.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Waits until the next page request is allowed.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for PageThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageThrottle").finish_non_exhaustive()
    }
}

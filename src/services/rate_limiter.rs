use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration, Instant};
use parking_lot::Mutex;

/// Rate limiter to control outbound request frequency
///
/// The chart API is unauthenticated and starts returning 429s under burst
/// traffic; a batch of 20 holdings fetched naively is exactly such a burst.
pub struct RateLimiter {
    /// Caps in-flight requests
    semaphore: Arc<Semaphore>,
    /// When the previous request went out, for pacing
    last_request: Arc<Mutex<Instant>>,
    /// Floor on the gap between consecutive requests
    min_delay: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `max_concurrent` - Maximum number of in-flight requests
    /// * `requests_per_minute` - Ceiling on request rate across all tasks
    pub fn new(max_concurrent: usize, requests_per_minute: u32) -> Self {
        let min_delay_ms = 60_000 / requests_per_minute as u64;
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            // Seeded in the past so the first request never waits
            last_request: Arc::new(Mutex::new(Instant::now() - Duration::from_secs(60))),
            min_delay: Duration::from_millis(min_delay_ms),
        }
    }

    /// Acquire permission to make a request
    ///
    /// Blocks until a concurrency permit is free and the minimum inter-request
    /// delay has elapsed. Returns a guard that releases the permit on drop.
    pub async fn acquire(&self) -> RateLimitGuard {
        // closed() is never called on this semaphore, acquire cannot fail
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .unwrap_or_else(|_| unreachable!("semaphore closed"));

        // Compute the pause under the lock, sleep after releasing it
        let pause = {
            let last = self.last_request.lock();
            self.min_delay.checked_sub(last.elapsed())
        };
        if let Some(pause) = pause {
            sleep(pause).await;
        }

        *self.last_request.lock() = Instant::now();

        RateLimitGuard { _permit: permit }
    }
}

/// Holds the concurrency permit for one request; dropping it frees the slot.
pub struct RateLimitGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}

use arena_types::ProviderId;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Per-provider token bucket. Workers block on the bucket rather than drop
/// a call (spec §4.6, rule 4). Optional: a `RateLimiter` with no configured
/// providers never throttles anyone.
pub struct RateLimiter {
    buckets: HashMap<ProviderId, Mutex<Bucket>>,
}

struct Bucket {
    capacity: f64,
    tokens: f64,
    refill_per_sec: f64,
    last_refill: Instant,
}

impl Bucket {
    fn new(rate_per_sec: f64) -> Self {
        Self { capacity: rate_per_sec.max(1.0), tokens: rate_per_sec.max(1.0), refill_per_sec: rate_per_sec, last_refill: Instant::now() }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        self.last_refill = now;
    }

    /// Time to wait before at least one token is available, or `None` if
    /// one is available now (and is immediately consumed).
    fn try_acquire(&mut self) -> Option<Duration> {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            None
        } else {
            let deficit = 1.0 - self.tokens;
            Some(Duration::from_secs_f64(deficit / self.refill_per_sec))
        }
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self { buckets: HashMap::new() }
    }

    pub fn with_limit(mut self, provider: ProviderId, calls_per_second: f64) -> Self {
        self.buckets.insert(provider, Mutex::new(Bucket::new(calls_per_second)));
        self
    }

    /// Blocks until a call slot for `provider` is available. Providers with
    /// no configured bucket are unthrottled.
    pub async fn acquire(&self, provider: &ProviderId) {
        let Some(bucket) = self.buckets.get(provider) else { return };
        loop {
            let wait = {
                let mut bucket = bucket.lock().await;
                bucket.try_acquire()
            };
            match wait {
                None => return,
                Some(delay) => tokio::time::sleep(delay).await,
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unconfigured_provider_is_never_throttled() {
        let limiter = RateLimiter::new();
        let provider = ProviderId::from("mock");
        for _ in 0..100 {
            limiter.acquire(&provider).await;
        }
    }

    #[tokio::test]
    async fn configured_bucket_allows_burst_up_to_capacity() {
        let limiter = RateLimiter::new().with_limit(ProviderId::from("mock"), 5.0);
        let provider = ProviderId::from("mock");
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire(&provider).await;
        }
        assert!(start.elapsed() < Duration::from_millis(200));
    }
}

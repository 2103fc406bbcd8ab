use crate::error::AppError;
use dashmap::DashMap;
use std::time::Instant;

#[derive(Clone)]
struct Bucket {
    capacity: u32,
    tokens: f64,
    refill_rate: f64,
    last_update: Instant,
}

impl Bucket {
    fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            capacity,
            tokens: capacity as f64,
            refill_rate,
            last_update: Instant::now(),
        }
    }

    fn allow_request(&mut self, tokens: u32) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_update).as_secs_f64();

        self.tokens = f64::min(
            self.capacity as f64,
            self.tokens + elapsed * self.refill_rate,
        );
        self.last_update = now;

        if self.tokens >= tokens as f64 {
            self.tokens -= tokens as f64;
            true
        } else {
            false
        }
    }
}

/// Token buckets keyed by e.g. "user_id:endpoint"
#[derive(Default)]
pub struct RateLimiter {
    buckets: DashMap<String, Bucket>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take one token from `key`'s bucket
    ///
    /// `capacity` is the burst size, `refill_rate` is tokens per second.
    pub fn check_rate_limit(&self, key: &str, capacity: u32, refill_rate: f64) -> Result<(), AppError> {
        let mut bucket = self
            .buckets
            .entry(key.to_string())
            .or_insert_with(|| Bucket::new(capacity, refill_rate));

        if bucket.allow_request(1) {
            Ok(())
        } else {
            Err(AppError::RateLimitExceeded(format!("Rate limit for {}", key)))
        }
    }

    /// Per-minute limit on match submissions for one user
    pub fn check_match_request(&self, user_id: &str, per_minute: u32) -> Result<(), AppError> {
        self.check_rate_limit(
            &format!("{}:match_requests", user_id),
            per_minute.max(1),
            f64::from(per_minute) / 60.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_limited() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.check_match_request("u1", 3).is_ok());
        }
        assert!(matches!(
            limiter.check_match_request("u1", 3),
            Err(AppError::RateLimitExceeded(_))
        ));
        // Other users have their own bucket
        assert!(limiter.check_match_request("u2", 3).is_ok());
    }
}

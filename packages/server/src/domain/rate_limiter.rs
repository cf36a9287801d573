//! Per-connection token bucket.
//!
//! Tokens refill lazily on every consumption attempt (`elapsed * rate`,
//! capped at capacity), so there is no background timer and the bucket is
//! driven entirely by the injected [`Clock`].

use std::sync::Arc;

use hiroba_shared::time::Clock;

/// Default sustained message rate (tokens per second)
pub const DEFAULT_RATE_PER_SECOND: f64 = 5.0;

/// Default bucket capacity
pub const DEFAULT_BURST: f64 = 10.0;

/// Rate limit settings, coerced to sane minimums on construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    rate_per_second: f64,
    burst: f64,
}

impl RateLimitConfig {
    /// Create a config; rate is clamped to `>= 0`, burst to `>= 1`.
    pub fn new(rate_per_second: f64, burst: f64) -> Self {
        let rate_per_second = if rate_per_second.is_finite() {
            rate_per_second.max(0.0)
        } else {
            0.0
        };
        let burst = if burst.is_finite() { burst.max(1.0) } else { 1.0 };
        Self {
            rate_per_second,
            burst,
        }
    }

    pub fn rate_per_second(&self) -> f64 {
        self.rate_per_second
    }

    pub fn burst(&self) -> f64 {
        self.burst
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_PER_SECOND, DEFAULT_BURST)
    }
}

/// Token bucket rate limiter
///
/// Invariant: `0 <= tokens <= capacity` at every observation point.
pub struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate_per_ms: f64,
    last_refill: i64,
    clock: Arc<dyn Clock>,
}

impl TokenBucket {
    /// Create a full bucket
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let last_refill = clock.now_millis();
        Self {
            tokens: config.burst(),
            capacity: config.burst(),
            refill_rate_per_ms: config.rate_per_second() / 1000.0,
            last_refill,
            clock,
        }
    }

    /// Take `n` tokens if available.
    ///
    /// Returns `true` iff at least `n` tokens were available, in which case
    /// they are deducted. A request larger than the capacity never succeeds,
    /// and a negative or non-finite request is refused so tokens stay within
    /// `0..=capacity`.
    pub fn try_consume(&mut self, n: f64) -> bool {
        if !n.is_finite() || n < 0.0 {
            return false;
        }
        self.refill();
        if self.tokens >= n {
            self.tokens -= n;
            true
        } else {
            false
        }
    }

    /// Tokens currently available (after refilling up to now)
    pub fn available(&mut self) -> f64 {
        self.refill();
        self.tokens
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    fn refill(&mut self) {
        let now = self.clock.now_millis();
        let elapsed = now - self.last_refill;
        // clock skew: never drain, never move the reference point backwards
        if elapsed <= 0 {
            return;
        }
        let added = elapsed as f64 * self.refill_rate_per_ms;
        self.tokens = (self.tokens + added).min(self.capacity);
        self.last_refill = now;
    }
}

impl std::fmt::Debug for TokenBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBucket")
            .field("tokens", &self.tokens)
            .field("capacity", &self.capacity)
            .field("refill_rate_per_ms", &self.refill_rate_per_ms)
            .field("last_refill", &self.last_refill)
            .finish()
    }
}

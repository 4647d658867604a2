//! Rate limiting port.

use std::time::Duration;

/// Rate limiter trait - abstraction over rate limiting backends.
///
/// Checks are synchronous so they can run inline in request middleware.
pub trait RateLimiter: Send + Sync {
    /// Record one request for `key` and report whether it may proceed.
    fn check(&self, key: &str) -> RateLimitResult;
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Time until the next request for this key would be admitted.
    pub retry_after: Duration,
}

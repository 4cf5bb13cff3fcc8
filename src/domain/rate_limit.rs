//! Rate limiting contract.

use async_trait::async_trait;
use std::time::Duration;

/// Outcome of a single rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests left in the current window after this one.
    pub remaining: u32,
    /// Time until the caller may retry. Zero when allowed.
    pub retry_after: Duration,
}

impl RateDecision {
    pub fn allow(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            retry_after: Duration::ZERO,
        }
    }

    pub fn deny(retry_after: Duration) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            retry_after,
        }
    }
}

/// Per-client request limiter.
///
/// Each call counts as one request against `client_key`. Implementations must
/// stay correct when many calls for the same key race.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check(&self, client_key: &str) -> RateDecision;

    /// Convenience wrapper returning only whether the request may proceed.
    async fn allow(&self, client_key: &str) -> bool {
        self.check(client_key).await.allowed
    }
}

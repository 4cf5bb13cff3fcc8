//! In-process sliding window rate limiter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::rate_limit::{RateDecision, RateLimiter};
use crate::utils::clock::{Clock, SystemClock};

/// Sliding window log keyed by client.
///
/// Each key keeps the timestamps of its accepted requests inside the window.
/// The map's per-shard entry lock serialises concurrent checks of one key, so
/// two racing requests can never both take the last slot.
pub struct MemoryRateLimiter {
    window: Duration,
    max_requests: u32,
    hits: DashMap<String, VecDeque<DateTime<Utc>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryRateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self::with_clock(window, max_requests, Arc::new(SystemClock))
    }

    pub fn with_clock(window: Duration, max_requests: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            max_requests,
            hits: DashMap::new(),
            clock,
        }
    }

    fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        chrono::Duration::from_std(self.window)
            .ok()
            .and_then(|w| now.checked_sub_signed(w))
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Drops expired timestamps and removes keys with nothing left.
    ///
    /// Returns the number of keys removed.
    pub fn purge_expired(&self) -> usize {
        let window_start = self.window_start(self.clock.now());
        let before = self.hits.len();

        self.hits.retain(|_, log| {
            while log.front().is_some_and(|t| *t <= window_start) {
                log.pop_front();
            }
            !log.is_empty()
        });

        before.saturating_sub(self.hits.len())
    }

    /// Spawns a task calling [`Self::purge_expired`] every `every`.
    pub fn spawn_purge_task(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.purge_expired();
                if removed > 0 {
                    debug!(removed, "Purged idle rate limit keys");
                }
            }
        })
    }
}

#[async_trait]
impl RateLimiter for MemoryRateLimiter {
    async fn check(&self, client_key: &str) -> RateDecision {
        let now = self.clock.now();
        let window_start = self.window_start(now);

        let mut log = self.hits.entry(client_key.to_string()).or_default();

        while log.front().is_some_and(|t| *t <= window_start) {
            log.pop_front();
        }

        let used = log.len() as u32;
        if used < self.max_requests {
            log.push_back(now);
            return RateDecision::allow(self.max_requests - used - 1);
        }

        let retry_after = log
            .front()
            .map(|oldest| *oldest - window_start)
            .and_then(|d| d.to_std().ok())
            .unwrap_or(self.window);

        RateDecision::deny(retry_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::ManualClock;

    const WINDOW: Duration = Duration::from_secs(15 * 60);

    fn limiter(max: u32) -> (MemoryRateLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (MemoryRateLimiter::with_clock(WINDOW, max, clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_allows_up_to_max_then_denies() {
        let (limiter, _) = limiter(5);

        for expected_remaining in (0..5).rev() {
            let decision = limiter.check("1.2.3.4").await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = limiter.check("1.2.3.4").await;
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after, WINDOW);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let (limiter, _) = limiter(1);

        assert!(limiter.allow("a").await);
        assert!(!limiter.allow("a").await);
        assert!(limiter.allow("b").await);
    }

    #[tokio::test]
    async fn test_window_slides() {
        let (limiter, clock) = limiter(2);

        assert!(limiter.allow("k").await);
        clock.advance(chrono::Duration::minutes(10));
        assert!(limiter.allow("k").await);
        assert!(!limiter.allow("k").await);

        // The first request leaves the window after 15 minutes.
        clock.advance(chrono::Duration::minutes(5));
        let decision = limiter.check("k").await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 0);

        let denied = limiter.check("k").await;
        assert!(!denied.allowed);
        assert_eq!(denied.retry_after, Duration::from_secs(10 * 60));
    }

    #[tokio::test]
    async fn test_rejected_requests_do_not_extend_window() {
        let (limiter, clock) = limiter(1);

        assert!(limiter.allow("k").await);
        for _ in 0..10 {
            assert!(!limiter.allow("k").await);
        }

        clock.advance(chrono::Duration::minutes(15));
        assert!(limiter.allow("k").await);
    }

    #[tokio::test]
    async fn test_purge_expired_removes_idle_keys() {
        let (limiter, clock) = limiter(5);

        limiter.check("old").await;
        clock.advance(chrono::Duration::minutes(16));
        limiter.check("fresh").await;

        assert_eq!(limiter.purge_expired(), 1);
        assert_eq!(limiter.hits.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checks_never_exceed_limit() {
        let (limiter, _) = limiter(5);
        let limiter = Arc::new(limiter);

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.allow("shared").await })
            })
            .collect();

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                allowed += 1;
            }
        }

        assert_eq!(allowed, 5);
    }
}

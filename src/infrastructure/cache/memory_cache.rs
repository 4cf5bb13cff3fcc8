//! In-process cache with per-entry expiry.

use super::service::{CacheResult, CacheService};
use crate::utils::clock::{Clock, SystemClock};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// Cache backed by a concurrent map.
///
/// Used when no Redis is configured. Expired entries are dropped lazily on
/// read, and in bulk by [`MemoryCache::purge_expired`], which the server runs
/// periodically through [`MemoryCache::spawn_purge_task`].
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.expires_at.is_none_or(|at| at > now));
        before.saturating_sub(self.entries.len())
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
                    debug!(removed, "Purged expired cache entries");
                }
            }
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let now = self.clock.now();

        match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.expires_at.is_none_or(|at| at > now) => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => {}
        }

        self.entries
            .remove_if(key, |_, entry| entry.expires_at.is_some_and(|at| at <= now));
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let expires_at = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl));

        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::ManualClock;

    fn cache_with_clock() -> (MemoryCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (MemoryCache::with_clock(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_get_and_overwrite() {
        let (cache, _) = cache_with_clock();

        assert_eq!(cache.get("k").await.unwrap(), None);

        cache.set("k", "v1", None).await.unwrap();
        cache.set("k", "v2", None).await.unwrap();

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let (cache, clock) = cache_with_clock();

        cache
            .set("k", "v", Some(Duration::from_secs(3600)))
            .await
            .unwrap();

        clock.advance(chrono::Duration::seconds(3599));
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        clock.advance(chrono::Duration::seconds(1));
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_no_ttl_never_expires() {
        let (cache, clock) = cache_with_clock();

        cache.set("k", "v", None).await.unwrap();
        clock.advance(chrono::Duration::days(365));

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (cache, clock) = cache_with_clock();

        cache
            .set("short", "v", Some(Duration::from_secs(10)))
            .await
            .unwrap();
        cache.set("forever", "v", None).await.unwrap();

        clock.advance(chrono::Duration::seconds(11));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_purge_task_reclaims_unread_entries() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = Arc::new(MemoryCache::with_clock(clock.clone()));

        for i in 0..50 {
            cache
                .set(&format!("analytics:{i}"), "{}", Some(Duration::from_secs(3600)))
                .await
                .unwrap();
        }
        cache.set("url:keep", "v", None).await.unwrap();
        clock.advance(chrono::Duration::hours(24));

        let task = cache.clone().spawn_purge_task(Duration::from_millis(10));

        // Nothing reads the expired keys; only the task can drop them.
        tokio::time::timeout(Duration::from_secs(5), async {
            while cache.len() > 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("purge task did not run");
        task.abort();

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("url:keep").await.unwrap().as_deref(), Some("v"));
    }
}

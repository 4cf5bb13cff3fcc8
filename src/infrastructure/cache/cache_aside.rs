//! Cache-aside lookup shared by alias resolution and analytics.
//!
//! Read the key; on a decodable hit return it verbatim. On a miss, a cache
//! error or an undecodable entry, run the loader, write its value back with the
//! given TTL and return it. Loader errors propagate untouched and are never
//! cached. Cache failures are logged and counted but never surface.

use std::future::Future;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, warn};

use super::service::{CacheError, CacheService};
use crate::domain::analytics::{AnalyticsSnapshot, OwnerAnalytics, TopicAnalytics};
use crate::error::AppError;

/// Value that can be stored as a cache string.
pub trait CacheValue: Sized {
    fn encode(&self) -> Result<String, CacheError>;
    fn decode(raw: String) -> Result<Self, CacheError>;
}

impl CacheValue for String {
    fn encode(&self) -> Result<String, CacheError> {
        Ok(self.clone())
    }

    fn decode(raw: String) -> Result<Self, CacheError> {
        Ok(raw)
    }
}

macro_rules! json_cache_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CacheValue for $ty {
                fn encode(&self) -> Result<String, CacheError> {
                    serde_json::to_string(self)
                        .map_err(|e| CacheError::SerializationError(e.to_string()))
                }

                fn decode(raw: String) -> Result<Self, CacheError> {
                    serde_json::from_str(&raw)
                        .map_err(|e| CacheError::SerializationError(e.to_string()))
                }
            }
        )*
    };
}

json_cache_value!(AnalyticsSnapshot, TopicAnalytics, OwnerAnalytics);

/// Writes a value, logging instead of failing.
pub async fn prime<T: CacheValue>(
    cache: &dyn CacheService,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) {
    let raw = match value.encode() {
        Ok(raw) => raw,
        Err(e) => {
            warn!(key, error = %e, "Failed to encode cache value");
            return;
        }
    };

    if let Err(e) = cache.set(key, &raw, ttl).await {
        warn!(key, error = %e, "Cache write failed");
    }
}

/// Looks up `key`, falling back to `load` on anything but a clean hit.
pub async fn cache_aside<T, F, Fut>(
    cache: &dyn CacheService,
    key: &str,
    ttl: Option<Duration>,
    load: F,
) -> Result<T, AppError>
where
    T: CacheValue,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    match cache.get(key).await {
        Ok(Some(raw)) => match T::decode(raw) {
            Ok(value) => {
                counter!("cache_lookups_total", "result" => "hit").increment(1);
                debug!(key, "Cache HIT");
                return Ok(value);
            }
            Err(e) => {
                counter!("cache_lookups_total", "result" => "corrupt").increment(1);
                warn!(key, error = %e, "Discarding undecodable cache entry");
            }
        },
        Ok(None) => {
            counter!("cache_lookups_total", "result" => "miss").increment(1);
            debug!(key, "Cache MISS");
        }
        Err(e) => {
            counter!("cache_lookups_total", "result" => "error").increment(1);
            warn!(key, error = %e, "Cache read failed, falling back to store");
        }
    }

    let value = load().await?;
    prime(cache, key, &value, ttl).await;
    Ok(value)
}

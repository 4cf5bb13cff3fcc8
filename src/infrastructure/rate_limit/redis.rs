//! Redis-backed fixed window rate limiter.

use async_trait::async_trait;
use redis::{Script, aio::ConnectionManager};
use std::time::Duration;
use tracing::warn;

use crate::domain::rate_limit::{RateDecision, RateLimiter};

/// Increments the window counter and starts its expiry on first use.
/// Returns `{count, ttl_seconds}`.
const INCR_WINDOW_SCRIPT: &str = r#"
local count = redis.call('INCR', KEYS[1])
local ttl = redis.call('TTL', KEYS[1])
if ttl < 0 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
    ttl = tonumber(ARGV[1])
end
return {count, ttl}
"#;

/// Fixed window counter shared by every instance using the same Redis.
///
/// One atomic script per check, so concurrent increments of a key are safe
/// across processes. Redis expiry bounds key growth. When Redis is unreachable
/// the request is allowed and a warning is logged.
pub struct RedisRateLimiter {
    conn: ConnectionManager,
    window: Duration,
    max_requests: u32,
    key_prefix: String,
}

impl RedisRateLimiter {
    pub fn new(
        conn: ConnectionManager,
        window: Duration,
        max_requests: u32,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            window,
            max_requests,
            key_prefix: key_prefix.into(),
        }
    }

    fn build_key(&self, client_key: &str) -> String {
        format!("{}ratelimit:{}", self.key_prefix, client_key)
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check(&self, client_key: &str) -> RateDecision {
        let key = self.build_key(client_key);
        let mut conn = self.conn.clone();
        let window_secs = self.window.as_secs().max(1);

        let result: redis::RedisResult<(u64, i64)> = Script::new(INCR_WINDOW_SCRIPT)
            .key(&key)
            .arg(window_secs)
            .invoke_async(&mut conn)
            .await;

        match result {
            Ok((count, _)) if count <= u64::from(self.max_requests) => {
                RateDecision::allow(self.max_requests - count as u32)
            }
            Ok((_, ttl)) => {
                let retry_after = u64::try_from(ttl).unwrap_or(window_secs).max(1);
                RateDecision::deny(Duration::from_secs(retry_after))
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Rate limiter unavailable, allowing request");
                RateDecision::allow(self.max_requests)
            }
        }
    }
}

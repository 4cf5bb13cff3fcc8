//! [`RateLimiter`](crate::domain::rate_limit::RateLimiter) implementations.
//!
//! - [`MemoryRateLimiter`] - Sliding window log for single-node deployments
//! - [`RedisRateLimiter`] - Fixed window counter shared across instances

mod memory;
mod redis;

pub use self::memory::MemoryRateLimiter;
pub use self::redis::RedisRateLimiter;

//! Caching layer for alias lookups and analytics snapshots.
//!
//! Provides a [`CacheService`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed cache
//! - [`MemoryCache`] - In-process cache for single-node deployments
//! - [`NullCache`] - No-op implementation for disabled caching
//!
//! [`cache_aside`] is the single read-through helper used by every cached
//! lookup. Key names live in [`keys`].

mod cache_aside;
pub mod keys;
mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use cache_aside::{CacheValue, cache_aside, prime};
pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheService};

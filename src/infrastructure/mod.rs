//! Infrastructure layer for external integrations.
//!
//! Implements the interfaces defined by the domain layer.
//!
//! - [`cache`] - Caching abstractions (Redis, in-memory and no-op implementations)
//! - [`persistence`] - PostgreSQL repository implementations
//! - [`rate_limit`] - Rate limiter backends

pub mod cache;
pub mod persistence;
pub mod rate_limit;

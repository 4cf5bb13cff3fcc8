//! PostgreSQL repository implementations.
//!
//! Queries are built at runtime with `sqlx::query_as` and mapped through
//! private `FromRow` structs, so the crate builds without a live database.
//!
//! - [`PgMappingRepository`] - Alias mappings
//! - [`PgClickRepository`] - Click log
//! - [`PgTokenRepository`] - API token storage and validation

pub mod pg_click_repository;
pub mod pg_mapping_repository;
pub mod pg_token_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_mapping_repository::PgMappingRepository;
pub use pg_token_repository::PgTokenRepository;

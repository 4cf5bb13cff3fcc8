//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations. Implementations live in
//! `crate::infrastructure::persistence`, and mocks are generated via `mockall`
//! for unit tests.
//!
//! - [`MappingRepository`] - Alias mappings
//! - [`ClickRepository`] - Append-only click log
//! - [`TokenRepository`] - API token authentication

pub mod click_repository;
pub mod mapping_repository;
pub mod token_repository;

pub use click_repository::ClickRepository;
pub use mapping_repository::MappingRepository;
pub use token_repository::{ApiToken, TokenRepository};

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use mapping_repository::MockMappingRepository;
#[cfg(test)]
pub use token_repository::MockTokenRepository;

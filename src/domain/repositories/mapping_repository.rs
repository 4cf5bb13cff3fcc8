//! Repository trait for alias mapping data access.

use crate::domain::entities::{NewUrlMapping, UrlMapping};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for alias mappings.
///
/// Mappings are immutable once inserted, so the interface only offers insert
/// and lookups. Uniqueness of the alias is enforced by `insert` itself.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgMappingRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingRepository: Send + Sync {
    /// Inserts a new mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the alias is already taken. The existing
    /// mapping is never overwritten.
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, new_mapping: NewUrlMapping) -> Result<UrlMapping, AppError>;

    /// Finds a mapping by alias.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_alias(&self, alias: &str) -> Result<Option<UrlMapping>, AppError>;

    /// Lists every mapping tagged with `topic`, ordered by alias.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_by_topic(&self, topic: &str) -> Result<Vec<UrlMapping>, AppError>;

    /// Lists every mapping created by `owner`, ordered by alias.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<UrlMapping>, AppError>;

    /// Verifies that the backing store is reachable.
    async fn health_check(&self) -> Result<(), AppError>;
}

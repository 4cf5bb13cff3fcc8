//! Repository trait for click event storage.

use crate::domain::analytics::{self, ClickSummary};
use crate::domain::entities::{ClickEvent, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the append-only click log.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends one click event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn insert(&self, click: NewClick) -> Result<ClickEvent, AppError>;

    /// Returns every click recorded for any of `aliases`.
    ///
    /// An empty slice yields an empty result without touching the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_for_aliases(&self, aliases: &[String]) -> Result<Vec<ClickEvent>, AppError>;

    /// Grouped click counts for `aliases`, with per-day counts from `since`.
    ///
    /// The default loads the raw events and groups them in memory. Stores that
    /// can aggregate should override it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn summarize(
        &self,
        aliases: &[String],
        since: DateTime<Utc>,
    ) -> Result<ClickSummary, AppError> {
        let clicks = self.list_for_aliases(aliases).await?;
        Ok(analytics::summarize(&clicks, since))
    }
}

//! Authenticated identity contract.

use async_trait::async_trait;

use crate::domain::entities::Identity;
use crate::error::AppError;

/// Turns a caller-supplied credential into an [`Identity`].
///
/// The HTTP layer calls this once per request and passes the result down
/// explicitly.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] when the credential is unknown or
    /// revoked, and [`AppError::Internal`] when the lookup itself fails.
    async fn identify(&self, credential: &str) -> Result<Identity, AppError>;
}

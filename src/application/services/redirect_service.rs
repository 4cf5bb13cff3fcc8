//! Redirect resolution with click capture.

use std::sync::Arc;
use tracing::warn;

use super::alias_service::AliasService;
use super::click_recorder::{ClickRecorder, RequestContext};
use crate::error::AppError;
use crate::utils::clock::Clock;

/// Resolves aliases for redirects and records one click per served redirect.
pub struct RedirectService {
    aliases: Arc<AliasService>,
    recorder: Arc<ClickRecorder>,
    clock: Arc<dyn Clock>,
}

impl RedirectService {
    pub fn new(
        aliases: Arc<AliasService>,
        recorder: Arc<ClickRecorder>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            aliases,
            recorder,
            clock,
        }
    }

    /// Returns the redirect target for `alias`.
    ///
    /// The click timestamp is taken when the redirect is served and the click
    /// is written before returning. A failed write is logged and never fails
    /// the redirect.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for an unknown alias and
    /// [`AppError::Internal`] if resolution fails.
    pub async fn handle_redirect(
        &self,
        alias: &str,
        context: RequestContext,
    ) -> Result<String, AppError> {
        let original_url = self.aliases.resolve(alias).await?;
        let clicked_at = self.clock.now();

        if let Err(e) = self.recorder.record(alias, clicked_at, &context).await {
            warn!(alias, error = %e, "Click lost after retries");
        }

        Ok(original_url)
    }
}

//! Click recording with bounded retries.

use chrono::{DateTime, Utc};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::debug;

use crate::domain::entities::{ClickEvent, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::domain::user_agent::classify;
use crate::error::AppError;

/// Caller metadata captured from the redirect request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

/// Classifies and persists click events.
pub struct ClickRecorder {
    clicks: Arc<dyn ClickRepository>,
    retries: usize,
}

impl ClickRecorder {
    /// `retries` is the number of extra insert attempts after the first failure.
    pub fn new(clicks: Arc<dyn ClickRepository>, retries: usize) -> Self {
        Self { clicks, retries }
    }

    /// Records one click for `alias` served at `clicked_at`.
    ///
    /// # Errors
    ///
    /// Returns the last store error once every attempt has failed.
    pub async fn record(
        &self,
        alias: &str,
        clicked_at: DateTime<Utc>,
        context: &RequestContext,
    ) -> Result<ClickEvent, AppError> {
        let (os, device) = classify(context.user_agent.as_deref());

        let click = NewClick {
            alias: alias.to_string(),
            clicked_at,
            user_agent: context.user_agent.clone(),
            ip_address: context.ip_address.clone(),
            os_name: os.as_str().to_string(),
            device_type: device.as_str().to_string(),
        };

        let strategy = ExponentialBackoff::from_millis(10)
            .max_delay(Duration::from_millis(200))
            .map(jitter)
            .take(self.retries);

        let result = Retry::spawn(strategy, || {
            let clicks = self.clicks.clone();
            let click = click.clone();
            async move { clicks.insert(click).await }
        })
        .await;

        match &result {
            Ok(event) => {
                counter!("clicks_recorded_total", "result" => "ok").increment(1);
                debug!(alias, id = event.id, os = %os, device = %device, "Click recorded");
            }
            Err(_) => counter!("clicks_recorded_total", "result" => "failed").increment(1),
        }

        result
    }
}

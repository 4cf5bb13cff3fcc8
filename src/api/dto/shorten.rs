//! DTOs for the alias creation endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{CreateAlias, CreatedAlias};

/// Request to create one alias.
///
/// Field-level format rules (URL scheme, alias alphabet, topic length) are
/// enforced by the alias service so that every entry point shares them.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    #[serde(default)]
    #[validate(length(max = 2048, message = "URL is too long"))]
    pub url: String,

    pub custom_alias: Option<String>,

    pub topic: Option<String>,
}

impl From<ShortenRequest> for CreateAlias {
    fn from(request: ShortenRequest) -> Self {
        Self {
            original_url: request.url,
            custom_alias: request.custom_alias,
            topic: request.topic,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub alias: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<CreatedAlias> for ShortenResponse {
    fn from(created: CreatedAlias) -> Self {
        Self {
            alias: created.alias,
            short_url: created.short_url,
            original_url: created.original_url,
            created_at: created.created_at,
        }
    }
}

//! Alias to URL mapping entity.

use chrono::{DateTime, Utc};

/// A stored alias mapping.
///
/// Created once and never updated. The alias is the primary key and is unique
/// across all mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMapping {
    pub alias: String,
    pub original_url: String,
    pub created_by: String,
    pub topic: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UrlMapping {
    /// Builds the public short URL for this mapping under `base_url`.
    pub fn short_url(&self, base_url: &str) -> String {
        short_url(base_url, &self.alias)
    }
}

/// Joins a base URL and an alias without doubling the slash.
pub fn short_url(base_url: &str, alias: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), alias)
}

/// Input data for inserting a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlMapping {
    pub alias: String,
    pub original_url: String,
    pub created_by: String,
    pub topic: Option<String>,
}

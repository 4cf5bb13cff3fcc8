//! Click event entity representing a single redirect.

use chrono::{DateTime, Utc};

/// A recorded redirect.
///
/// Append-only. The timestamp is the moment the redirect was served, and the
/// OS and device categories are derived from the raw user agent at record time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub id: i64,
    pub alias: String,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub os_name: String,
    pub device_type: String,
}

/// Input data for recording a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClick {
    pub alias: String,
    pub clicked_at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub os_name: String,
    pub device_type: String,
}

impl NewClick {
    /// Attaches a storage id, producing the persisted event.
    pub fn into_event(self, id: i64) -> ClickEvent {
        ClickEvent {
            id,
            alias: self.alias,
            clicked_at: self.clicked_at,
            user_agent: self.user_agent,
            ip_address: self.ip_address,
            os_name: self.os_name,
            device_type: self.device_type,
        }
    }
}

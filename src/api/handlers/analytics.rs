//! Handlers for click analytics.
//!
//! All three endpoints require authentication and answer with camelCase
//! snapshots that may be up to one cache TTL old.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::domain::analytics::{AnalyticsSnapshot, OwnerAnalytics, TopicAnalytics};
use crate::domain::entities::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/analytics/{alias}`
///
/// ```json
/// {
///   "totalClicks": 12,
///   "uniqueUsers": 7,
///   "clicksByDate": [{ "date": "2024-06-15", "clickCount": 4 }],
///   "osType": [{ "osName": "iOS", "uniqueClicks": 5, "uniqueUsers": 3 }],
///   "deviceType": [{ "deviceName": "Mobile", "uniqueClicks": 8, "uniqueUsers": 5 }]
/// }
/// ```
pub async fn alias_analytics_handler(
    State(state): State<AppState>,
    Path(alias): Path<String>,
) -> Result<Json<AnalyticsSnapshot>, AppError> {
    Ok(Json(state.analytics_service.by_alias(&alias).await?))
}

/// `GET /api/analytics/topic/{topic}`
///
/// The alias snapshot fields plus `urls`, one entry per alias in the topic.
pub async fn topic_analytics_handler(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<Json<TopicAnalytics>, AppError> {
    Ok(Json(state.analytics_service.by_topic(&topic).await?))
}

/// `GET /api/analytics/overall`
///
/// Covers every alias created by the caller, plus `totalUrls`.
pub async fn overall_analytics_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<OwnerAnalytics>, AppError> {
    Ok(Json(state.analytics_service.by_owner(&identity).await?))
}

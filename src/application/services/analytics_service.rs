//! Cached click analytics.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::application::services::alias_service::clean_topic;
use crate::domain::analytics::{
    AnalyticsSnapshot, ClickSummary, OwnerAnalytics, TopicAnalytics, aggregate_owner,
    aggregate_topic, snapshot, window_start,
};
use crate::domain::entities::{Identity, UrlMapping};
use crate::domain::repositories::{ClickRepository, MappingRepository};
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, cache_aside, keys};
use crate::utils::clock::Clock;

/// Serves analytics snapshots per alias, per topic and per owner.
///
/// Snapshots are aggregated by the click store on a cache miss and cached
/// for `ttl`. They are never updated incrementally, so a cached snapshot may
/// lag behind new clicks until it expires.
///
/// Unknown aliases and topics are reported as [`AppError::NotFound`] and are
/// never cached. A known alias or topic without clicks yields a zero snapshot,
/// as does an owner without aliases.
pub struct AnalyticsService {
    mappings: Arc<dyn MappingRepository>,
    clicks: Arc<dyn ClickRepository>,
    cache: Arc<dyn CacheService>,
    clock: Arc<dyn Clock>,
    base_url: String,
    ttl: Duration,
}

impl AnalyticsService {
    pub fn new(
        mappings: Arc<dyn MappingRepository>,
        clicks: Arc<dyn ClickRepository>,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        base_url: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            mappings,
            clicks,
            cache,
            clock,
            base_url: base_url.into(),
            ttl,
        }
    }

    pub async fn by_alias(&self, alias: &str) -> Result<AnalyticsSnapshot, AppError> {
        cache_aside(
            self.cache.as_ref(),
            &keys::alias_analytics(alias),
            Some(self.ttl),
            || async {
                if self.mappings.find_by_alias(alias).await?.is_none() {
                    return Err(AppError::not_found(
                        "Alias not found",
                        json!({ "alias": alias }),
                    ));
                }

                let summary = self
                    .clicks
                    .summarize(&[alias.to_string()], window_start(self.clock.now()))
                    .await?;
                Ok(snapshot(&summary))
            },
        )
        .await
    }

    /// Topics are trimmed the same way as at creation, so a padded path segment
    /// finds the stored topic.
    pub async fn by_topic(&self, topic: &str) -> Result<TopicAnalytics, AppError> {
        let topic = clean_topic(topic)?;

        cache_aside(
            self.cache.as_ref(),
            &keys::topic_analytics(topic),
            Some(self.ttl),
            || async {
                let mappings = self.mappings.list_by_topic(topic).await?;
                if mappings.is_empty() {
                    return Err(AppError::not_found(
                        "Topic not found",
                        json!({ "topic": topic }),
                    ));
                }

                let summary = self.summarize(&mappings).await?;
                Ok(aggregate_topic(&mappings, &summary, &self.base_url))
            },
        )
        .await
    }

    pub async fn by_owner(&self, owner: &Identity) -> Result<OwnerAnalytics, AppError> {
        cache_aside(
            self.cache.as_ref(),
            &keys::owner_analytics(owner.as_str()),
            Some(self.ttl),
            || async {
                let mappings = self.mappings.list_by_owner(owner.as_str()).await?;
                let summary = self.summarize(&mappings).await?;
                Ok(aggregate_owner(&mappings, &summary))
            },
        )
        .await
    }

    async fn summarize(&self, mappings: &[UrlMapping]) -> Result<ClickSummary, AppError> {
        let aliases: Vec<String> = mappings.iter().map(|m| m.alias.clone()).collect();
        self.clicks
            .summarize(&aliases, window_start(self.clock.now()))
            .await
    }
}

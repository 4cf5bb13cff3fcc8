//! Alias creation and resolution service.

use chrono::{DateTime, Utc};
use metrics::counter;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::entities::{Identity, NewUrlMapping, UrlMapping};
use crate::domain::repositories::MappingRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheService, cache_aside, keys, prime};
use crate::utils::alias_generator::{AliasGenerator, validate_custom_alias};
use crate::utils::url_validator::validate_target_url;

pub const MAX_TOPIC_LENGTH: usize = 64;

/// Input for [`AliasService::create`].
#[derive(Debug, Clone, Default)]
pub struct CreateAlias {
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub topic: Option<String>,
}

/// Result of [`AliasService::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAlias {
    pub alias: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    /// `true` when an existing mapping was returned instead of inserting one.
    pub reused: bool,
}

/// Service for creating and resolving aliases.
///
/// The durable store is always written before the cache. Uniqueness comes
/// from the store's insert, so a colliding alias is reported as a conflict
/// and never overwrites an existing mapping.
pub struct AliasService {
    mappings: Arc<dyn MappingRepository>,
    cache: Arc<dyn CacheService>,
    generator: Arc<AliasGenerator>,
    base_url: String,
    max_attempts: u32,
}

impl AliasService {
    pub fn new(
        mappings: Arc<dyn MappingRepository>,
        cache: Arc<dyn CacheService>,
        generator: Arc<AliasGenerator>,
        base_url: impl Into<String>,
        max_attempts: u32,
    ) -> Self {
        Self {
            mappings,
            cache,
            generator,
            base_url: base_url.into(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates an alias for `request.original_url` owned by `owner`.
    ///
    /// # Custom aliases
    ///
    /// Validated, then inserted once. A taken alias fails with
    /// [`AppError::Conflict`].
    ///
    /// # Generated aliases
    ///
    /// If the `url:` cache entry points at a mapping with the same owner and
    /// topic, that mapping is returned with `reused = true`. Otherwise random
    /// aliases are inserted until one succeeds or `max_attempts` collisions
    /// have occurred, after which [`AppError::Conflict`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty or non-HTTP(S) URL, an
    /// invalid custom alias, or a blank or overlong topic.
    pub async fn create(
        &self,
        request: CreateAlias,
        owner: &Identity,
    ) -> Result<CreatedAlias, AppError> {
        validate_target_url(&request.original_url).map_err(|e| {
            AppError::bad_request(e.to_string(), json!({ "field": "url" }))
        })?;
        let topic = normalize_topic(request.topic)?;

        if let Some(custom) = request.custom_alias {
            validate_custom_alias(&custom)?;

            let mapping = self
                .mappings
                .insert(NewUrlMapping {
                    alias: custom,
                    original_url: request.original_url,
                    created_by: owner.as_str().to_string(),
                    topic,
                })
                .await?;

            counter!("aliases_created_total", "kind" => "custom").increment(1);
            return Ok(self.finish(mapping).await);
        }

        if let Some(existing) = self
            .find_reusable(&request.original_url, owner, topic.as_deref())
            .await
        {
            counter!("aliases_created_total", "kind" => "reused").increment(1);
            debug!(alias = %existing.alias, "Reusing existing alias");
            return Ok(self.created(existing, true));
        }

        for attempt in 1..=self.max_attempts {
            let candidate = NewUrlMapping {
                alias: self.generator.generate(),
                original_url: request.original_url.clone(),
                created_by: owner.as_str().to_string(),
                topic: topic.clone(),
            };

            match self.mappings.insert(candidate).await {
                Ok(mapping) => {
                    counter!("aliases_created_total", "kind" => "generated").increment(1);
                    return Ok(self.finish(mapping).await);
                }
                Err(AppError::Conflict { .. }) => {
                    warn!(attempt, "Generated alias collided, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::conflict(
            "Failed to generate a unique alias",
            json!({ "attempts": self.max_attempts }),
        ))
    }

    /// Resolves an alias to its original URL through the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no mapping exists.
    /// Returns [`AppError::Internal`] if the store fails on a cache miss.
    pub async fn resolve(&self, alias: &str) -> Result<String, AppError> {
        cache_aside(self.cache.as_ref(), &keys::alias(alias), None, || async {
            self.mappings
                .find_by_alias(alias)
                .await?
                .map(|mapping| mapping.original_url)
                .ok_or_else(|| AppError::not_found("Alias not found", json!({ "alias": alias })))
        })
        .await
    }

    async fn finish(&self, mapping: UrlMapping) -> CreatedAlias {
        prime(
            self.cache.as_ref(),
            &keys::alias(&mapping.alias),
            &mapping.original_url,
            None,
        )
        .await;
        prime(
            self.cache.as_ref(),
            &keys::url(&mapping.original_url),
            &mapping.alias,
            None,
        )
        .await;

        info!(alias = %mapping.alias, owner = %mapping.created_by, "Alias created");
        self.created(mapping, false)
    }

    fn created(&self, mapping: UrlMapping, reused: bool) -> CreatedAlias {
        CreatedAlias {
            short_url: mapping.short_url(&self.base_url),
            alias: mapping.alias,
            original_url: mapping.original_url,
            created_at: mapping.created_at,
            reused,
        }
    }

    /// Looks up a mapping the caller may reuse. Any failure counts as "none".
    async fn find_reusable(
        &self,
        original_url: &str,
        owner: &Identity,
        topic: Option<&str>,
    ) -> Option<UrlMapping> {
        let alias = match self.cache.get(&keys::url(original_url)).await {
            Ok(Some(alias)) => alias,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Cache read failed during reuse lookup");
                return None;
            }
        };

        match self.mappings.find_by_alias(&alias).await {
            Ok(Some(mapping))
                if mapping.original_url == original_url
                    && mapping.created_by == owner.as_str()
                    && mapping.topic.as_deref() == topic =>
            {
                Some(mapping)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Store lookup failed during reuse lookup");
                None
            }
        }
    }
}

fn normalize_topic(topic: Option<String>) -> Result<Option<String>, AppError> {
    let Some(topic) = topic else {
        return Ok(None);
    };

    Ok(Some(clean_topic(&topic)?.to_string()))
}

/// Trims a topic and checks its length.
///
/// Used both when storing a topic and when looking one up, so the two agree.
pub(crate) fn clean_topic(topic: &str) -> Result<&str, AppError> {
    let trimmed = topic.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_TOPIC_LENGTH {
        return Err(AppError::bad_request(
            format!("Topic must be 1-{MAX_TOPIC_LENGTH} characters"),
            json!({ "field": "topic" }),
        ));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockMappingRepository;
    use crate::infrastructure::cache::MemoryCache;

    const BASE: &str = "https://s.test";

    fn owner() -> Identity {
        Identity::new("owner@example.com")
    }

    fn stored(new: NewUrlMapping) -> UrlMapping {
        UrlMapping {
            alias: new.alias,
            original_url: new.original_url,
            created_by: new.created_by,
            topic: new.topic,
            created_at: Utc::now(),
        }
    }

    fn taken() -> AppError {
        AppError::conflict("Alias already exists", json!({}))
    }

    fn service(repo: MockMappingRepository, cache: Arc<MemoryCache>) -> AliasService {
        AliasService::new(
            Arc::new(repo),
            cache,
            Arc::new(AliasGenerator::from_seed(7)),
            BASE,
            5,
        )
    }

    fn request(url: &str) -> CreateAlias {
        CreateAlias {
            original_url: url.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_generated_primes_cache() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|new| Ok(stored(new)));

        let cache = Arc::new(MemoryCache::new());
        let service = service(repo, cache.clone());

        let created = service
            .create(request("https://example.com/long"), &owner())
            .await
            .unwrap();

        assert_eq!(created.alias.len(), 8);
        assert_eq!(created.short_url, format!("{BASE}/{}", created.alias));
        assert!(!created.reused);
        assert_eq!(
            cache.get(&keys::alias(&created.alias)).await.unwrap().as_deref(),
            Some("https://example.com/long")
        );
        assert_eq!(
            cache
                .get(&keys::url("https://example.com/long"))
                .await
                .unwrap(),
            Some(created.alias.clone())
        );
    }

    #[tokio::test]
    async fn test_create_custom_alias() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert()
            .withf(|new| new.alias == "promo" && new.topic.as_deref() == Some("sales"))
            .times(1)
            .returning(|new| Ok(stored(new)));

        let service = service(repo, Arc::new(MemoryCache::new()));

        let created = service
            .create(
                CreateAlias {
                    original_url: "https://example.com".to_string(),
                    custom_alias: Some("promo".to_string()),
                    topic: Some("  sales ".to_string()),
                },
                &owner(),
            )
            .await
            .unwrap();

        assert_eq!(created.alias, "promo");
        assert_eq!(created.short_url, "https://s.test/promo");
    }

    #[tokio::test]
    async fn test_custom_alias_conflict_does_not_touch_cache() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert().times(1).returning(|_| Err(taken()));

        let cache = Arc::new(MemoryCache::new());
        let service = service(repo, cache.clone());

        let result = service
            .create(
                CreateAlias {
                    original_url: "https://example.com".to_string(),
                    custom_alias: Some("promo".to_string()),
                    topic: None,
                },
                &owner(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_generated_alias_retries_on_collision() {
        let mut repo = MockMappingRepository::new();
        let mut calls = 0;
        repo.expect_insert().times(3).returning(move |new| {
            calls += 1;
            if calls < 3 { Err(taken()) } else { Ok(stored(new)) }
        });

        let service = service(repo, Arc::new(MemoryCache::new()));

        let created = service
            .create(request("https://example.com"), &owner())
            .await
            .unwrap();

        assert_eq!(created.alias.len(), 8);
    }

    #[tokio::test]
    async fn test_generated_alias_gives_up_after_max_attempts() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert().times(5).returning(|_| Err(taken()));

        let service = service(repo, Arc::new(MemoryCache::new()));

        let result = service.create(request("https://example.com"), &owner()).await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_store_error_is_not_retried() {
        let mut repo = MockMappingRepository::new();
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let service = service(repo, Arc::new(MemoryCache::new()));

        let result = service.create(request("https://example.com"), &owner()).await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let repo = MockMappingRepository::new();
        let service = service(repo, Arc::new(MemoryCache::new()));

        let empty = service.create(request(""), &owner()).await.unwrap_err();
        assert!(matches!(empty, AppError::Validation { .. }));
        assert_eq!(empty.to_string(), "URL is required");

        let scheme = service
            .create(request("javascript:alert(1)"), &owner())
            .await;
        assert!(matches!(scheme, Err(AppError::Validation { .. })));

        let bad_alias = service
            .create(
                CreateAlias {
                    original_url: "https://example.com".to_string(),
                    custom_alias: Some("no spaces".to_string()),
                    topic: None,
                },
                &owner(),
            )
            .await;
        assert!(matches!(bad_alias, Err(AppError::Validation { .. })));

        let blank_topic = service
            .create(
                CreateAlias {
                    original_url: "https://example.com".to_string(),
                    custom_alias: None,
                    topic: Some("   ".to_string()),
                },
                &owner(),
            )
            .await;
        assert!(matches!(blank_topic, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_reuses_mapping_for_same_owner_and_topic() {
        let existing = UrlMapping {
            alias: "exist123".to_string(),
            original_url: "https://example.com".to_string(),
            created_by: owner().to_string(),
            topic: None,
            created_at: Utc::now(),
        };

        let mut repo = MockMappingRepository::new();
        let found = existing.clone();
        repo.expect_find_by_alias()
            .withf(|alias| alias == "exist123")
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_insert().never();

        let cache = Arc::new(MemoryCache::new());
        cache
            .set(&keys::url("https://example.com"), "exist123", None)
            .await
            .unwrap();

        let service = service(repo, cache);

        let created = service
            .create(request("https://example.com"), &owner())
            .await
            .unwrap();

        assert!(created.reused);
        assert_eq!(created.alias, "exist123");
    }

    #[tokio::test]
    async fn test_does_not_reuse_other_owners_mapping() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_alias().returning(|_| {
            Ok(Some(UrlMapping {
                alias: "exist123".to_string(),
                original_url: "https://example.com".to_string(),
                created_by: "someone-else".to_string(),
                topic: None,
                created_at: Utc::now(),
            }))
        });
        repo.expect_insert()
            .times(1)
            .returning(|new| Ok(stored(new)));

        let cache = Arc::new(MemoryCache::new());
        cache
            .set(&keys::url("https://example.com"), "exist123", None)
            .await
            .unwrap();

        let service = service(repo, cache);

        let created = service
            .create(request("https://example.com"), &owner())
            .await
            .unwrap();

        assert!(!created.reused);
        assert_ne!(created.alias, "exist123");
    }

    #[tokio::test]
    async fn test_resolve_uses_cache_after_first_lookup() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_alias().times(1).returning(|alias| {
            Ok(Some(UrlMapping {
                alias: alias.to_string(),
                original_url: "https://example.com/target".to_string(),
                created_by: "x".to_string(),
                topic: None,
                created_at: Utc::now(),
            }))
        });

        let service = service(repo, Arc::new(MemoryCache::new()));

        assert_eq!(
            service.resolve("abc").await.unwrap(),
            "https://example.com/target"
        );
        assert_eq!(
            service.resolve("abc").await.unwrap(),
            "https://example.com/target"
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_alias() {
        let mut repo = MockMappingRepository::new();
        repo.expect_find_by_alias().returning(|_| Ok(None));

        let service = service(repo, Arc::new(MemoryCache::new()));

        let result = service.resolve("missing").await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}

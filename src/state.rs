//! Shared application state passed to handlers and middleware.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{
    AliasService, AnalyticsService, ClickRecorder, RedirectService,
};
use crate::domain::identity_provider::IdentityProvider;
use crate::domain::rate_limit::RateLimiter;
use crate::domain::repositories::{ClickRepository, MappingRepository};
use crate::infrastructure::cache::CacheService;
use crate::utils::alias_generator::AliasGenerator;
use crate::utils::clock::Clock;

/// Tunables that shape the services built by [`AppState::build`].
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub base_url: String,
    pub alias_max_attempts: u32,
    pub click_record_retries: usize,
    pub analytics_ttl: Duration,
    pub behind_proxy: bool,
}

/// Storage, cache and policy backends the services are wired from.
pub struct Backends {
    pub mappings: Arc<dyn MappingRepository>,
    pub clicks: Arc<dyn ClickRepository>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub cache: Arc<dyn CacheService>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub clock: Arc<dyn Clock>,
    pub generator: Arc<AliasGenerator>,
}

/// Cloned into every request. All fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub alias_service: Arc<AliasService>,
    pub redirect_service: Arc<RedirectService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    /// Kept for health checks.
    pub mappings: Arc<dyn MappingRepository>,
    pub cache: Arc<dyn CacheService>,
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires the services over the given backends.
    pub fn build(backends: Backends, options: ServiceOptions) -> Self {
        let Backends {
            mappings,
            clicks,
            identity_provider,
            cache,
            rate_limiter,
            clock,
            generator,
        } = backends;

        let alias_service = Arc::new(AliasService::new(
            mappings.clone(),
            cache.clone(),
            generator,
            options.base_url.clone(),
            options.alias_max_attempts,
        ));

        let recorder = Arc::new(ClickRecorder::new(
            clicks.clone(),
            options.click_record_retries,
        ));

        let redirect_service = Arc::new(RedirectService::new(
            alias_service.clone(),
            recorder,
            clock.clone(),
        ));

        let analytics_service = Arc::new(AnalyticsService::new(
            mappings.clone(),
            clicks,
            cache.clone(),
            clock,
            options.base_url,
            options.analytics_ttl,
        ));

        Self {
            alias_service,
            redirect_service,
            analytics_service,
            identity_provider,
            rate_limiter,
            mappings,
            cache,
            behind_proxy: options.behind_proxy,
        }
    }
}

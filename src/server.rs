//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache and rate limiter selection, and the
//! Axum server lifecycle.

use crate::application::services::AuthService;
use crate::config::Config;
use crate::domain::rate_limit::RateLimiter;
use crate::infrastructure::cache::{CacheService, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::persistence::{
    PgClickRepository, PgMappingRepository, PgTokenRepository,
};
use crate::infrastructure::rate_limit::{MemoryRateLimiter, RedisRateLimiter};
use crate::routes::app_router;
use crate::state::{AppState, Backends, ServiceOptions};
use crate::utils::alias_generator::AliasGenerator;
use crate::utils::clock::{Clock, SystemClock};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How often the in-memory cache and rate limiter drop expired entries.
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Cache (Redis, in-memory, or disabled)
/// - Creation rate limiter (Redis when Redis is in use, in-memory otherwise)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations applied");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (cache, redis_conn) = select_cache(&config).await;
    let rate_limiter = select_rate_limiter(&config, redis_conn, clock.clone());

    let generator = AliasGenerator::from_entropy()
        .map_err(|e| anyhow::anyhow!("Failed to seed alias generator: {}", e))?;

    let pool = Arc::new(pool);
    let tokens = Arc::new(PgTokenRepository::new(pool.clone()));
    let identity_provider = Arc::new(AuthService::new(
        tokens,
        config.token_signing_secret.clone(),
    ));

    let state = AppState::build(
        Backends {
            mappings: Arc::new(PgMappingRepository::new(pool.clone())),
            clicks: Arc::new(PgClickRepository::new(pool)),
            identity_provider,
            cache,
            rate_limiter,
            clock,
            generator: Arc::new(generator),
        },
        ServiceOptions {
            base_url: config.base_url.clone(),
            alias_max_attempts: config.alias_max_attempts,
            click_record_retries: config.click_record_retries,
            analytics_ttl: config.analytics_cache_ttl(),
            behind_proxy: config.behind_proxy,
        },
    );

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Picks the cache backend. The Redis connection is returned alongside so the
/// rate limiter can share it.
async fn select_cache(config: &Config) -> (Arc<dyn CacheService>, Option<ConnectionManager>) {
    if config.cache_disabled {
        tracing::info!("Cache disabled (NullCache)");
        return (Arc::new(NullCache::new()), None);
    }

    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache enabled (in-memory)");
        return (memory_cache(), None);
    };

    match RedisCache::connect(redis_url, config.cache_key_prefix.clone()).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            let conn = redis.connection();
            let cache: Arc<dyn CacheService> = Arc::new(redis);
            (cache, Some(conn))
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using in-memory cache.", e);
            (memory_cache(), None)
        }
    }
}

fn memory_cache() -> Arc<dyn CacheService> {
    let cache = Arc::new(MemoryCache::new());
    cache.clone().spawn_purge_task(PURGE_INTERVAL);
    cache
}

fn select_rate_limiter(
    config: &Config,
    redis_conn: Option<ConnectionManager>,
    clock: Arc<dyn Clock>,
) -> Arc<dyn RateLimiter> {
    let window = config.rate_limit_window();
    let max_requests = config.rate_limit_max_requests;

    if let Some(conn) = redis_conn {
        tracing::info!("Rate limiter: Redis");
        return Arc::new(RedisRateLimiter::new(
            conn,
            window,
            max_requests,
            config.cache_key_prefix.clone(),
        ));
    }

    tracing::info!("Rate limiter: in-memory");
    let limiter = Arc::new(MemoryRateLimiter::with_clock(window, max_requests, clock));
    limiter.clone().spawn_purge_task(PURGE_INTERVAL);
    limiter
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

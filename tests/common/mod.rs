#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::Layer;

use alias_shortener::domain::entities::{ClickEvent, Identity, NewClick, NewUrlMapping, UrlMapping};
use alias_shortener::domain::identity_provider::IdentityProvider;
use alias_shortener::domain::repositories::{ClickRepository, MappingRepository};
use alias_shortener::error::AppError;
use alias_shortener::infrastructure::cache::MemoryCache;
use alias_shortener::infrastructure::rate_limit::MemoryRateLimiter;
use alias_shortener::routes::build_router;
use alias_shortener::state::{AppState, Backends, ServiceOptions};
use alias_shortener::utils::alias_generator::AliasGenerator;
use alias_shortener::utils::clock::{Clock, ManualClock};

pub const BASE_URL: &str = "http://sho.rt";
pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";
pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

/// Mapping store keyed by alias. Inserting a taken alias is a conflict.
#[derive(Default)]
pub struct InMemoryMappings {
    rows: Mutex<HashMap<String, UrlMapping>>,
    clock: Option<Arc<ManualClock>>,
}

impl InMemoryMappings {
    pub fn with_clock(clock: Arc<ManualClock>) -> Self {
        Self {
            rows: Mutex::default(),
            clock: Some(clock),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl MappingRepository for InMemoryMappings {
    async fn insert(&self, new_mapping: NewUrlMapping) -> Result<UrlMapping, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&new_mapping.alias) {
            return Err(AppError::conflict(
                "Alias already exists",
                json!({ "alias": new_mapping.alias }),
            ));
        }

        let created_at = self.clock.as_ref().map(|c| c.now()).unwrap_or_else(start_time);
        let mapping = UrlMapping {
            alias: new_mapping.alias.clone(),
            original_url: new_mapping.original_url,
            created_by: new_mapping.created_by,
            topic: new_mapping.topic,
            created_at,
        };
        rows.insert(new_mapping.alias, mapping.clone());
        Ok(mapping)
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<UrlMapping>, AppError> {
        Ok(self.rows.lock().unwrap().get(alias).cloned())
    }

    async fn list_by_topic(&self, topic: &str) -> Result<Vec<UrlMapping>, AppError> {
        let mut found: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.topic.as_deref() == Some(topic))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.alias.cmp(&b.alias));
        Ok(found)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<UrlMapping>, AppError> {
        let mut found: Vec<_> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.created_by == owner)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.alias.cmp(&b.alias));
        Ok(found)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryClicks {
    rows: Mutex<Vec<ClickEvent>>,
}

impl InMemoryClicks {
    pub fn all(&self) -> Vec<ClickEvent> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClickRepository for InMemoryClicks {
    async fn insert(&self, click: NewClick) -> Result<ClickEvent, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let event = click.into_event(rows.len() as i64 + 1);
        rows.push(event.clone());
        Ok(event)
    }

    async fn list_for_aliases(&self, aliases: &[String]) -> Result<Vec<ClickEvent>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| aliases.contains(&c.alias))
            .cloned()
            .collect())
    }
}

/// Maps fixed tokens to identities.
pub struct StaticIdentities(HashMap<String, String>);

impl Default for StaticIdentities {
    fn default() -> Self {
        Self(HashMap::from([
            (ALICE_TOKEN.to_string(), ALICE.to_string()),
            (BOB_TOKEN.to_string(), BOB.to_string()),
        ]))
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentities {
    async fn identify(&self, credential: &str) -> Result<Identity, AppError> {
        self.0
            .get(credential)
            .map(Identity::new)
            .ok_or_else(|| AppError::unauthorized("Invalid token", json!({})))
    }
}

/// Inserts `ConnectInfo` the way `into_make_service_with_connect_info` does.
#[derive(Clone)]
pub struct MockConnectInfoLayer(pub SocketAddr);

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.0,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}

/// A fully wired in-memory application.
pub struct TestApp {
    pub state: AppState,
    pub mappings: Arc<InMemoryMappings>,
    pub clicks: Arc<InMemoryClicks>,
    pub clock: Arc<ManualClock>,
}

pub struct TestOptions {
    pub rate_limit: u32,
    pub rate_window: Duration,
    pub behind_proxy: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            rate_limit: 100,
            rate_window: Duration::from_secs(900),
            behind_proxy: false,
        }
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_options(TestOptions::default())
    }

    pub fn with_options(options: TestOptions) -> Self {
        let clock = Arc::new(ManualClock::new(start_time()));
        let mappings = Arc::new(InMemoryMappings::with_clock(clock.clone()));
        let clicks = Arc::new(InMemoryClicks::default());

        let state = AppState::build(
            Backends {
                mappings: mappings.clone(),
                clicks: clicks.clone(),
                identity_provider: Arc::new(StaticIdentities::default()),
                cache: Arc::new(MemoryCache::with_clock(clock.clone())),
                rate_limiter: Arc::new(MemoryRateLimiter::with_clock(
                    options.rate_window,
                    options.rate_limit,
                    clock.clone(),
                )),
                clock: clock.clone(),
                generator: Arc::new(AliasGenerator::from_seed(7)),
            },
            ServiceOptions {
                base_url: BASE_URL.to_string(),
                alias_max_attempts: 5,
                click_record_retries: 0,
                analytics_ttl: Duration::from_secs(3600),
                behind_proxy: options.behind_proxy,
            },
        );

        Self {
            state,
            mappings,
            clicks,
            clock,
        }
    }

    pub fn router(&self, peer: SocketAddr) -> Router {
        build_router(self.state.clone()).layer(MockConnectInfoLayer(peer))
    }

    pub fn server(&self) -> TestServer {
        self.server_from("127.0.0.1:40000".parse().unwrap())
    }

    pub fn server_from(&self, peer: SocketAddr) -> TestServer {
        TestServer::new(self.router(peer)).unwrap()
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{alias}`     - Alias redirect (public)
//! - `GET  /health`      - Health check: database and cache (public)
//! - `/api/*`            - Alias creation, redirect and analytics
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with all routes and middleware except path
/// normalization.
///
/// Requests must carry `ConnectInfo<SocketAddr>`, either from
/// `into_make_service_with_connect_info` or a `MockConnectInfo` layer.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/{alias}", get(redirect_handler))
        .nest("/api", api::routes::routes(state.clone()))
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router, trimming trailing slashes before
/// routing.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state))
}

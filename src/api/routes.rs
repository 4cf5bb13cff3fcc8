//! API route configuration.

use crate::api::handlers::{
    alias_analytics_handler, overall_analytics_handler, redirect_handler, shorten_handler,
    topic_analytics_handler,
};
use crate::api::middleware::{auth, rate_limit};
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`                 - Create an alias (auth + creation rate limit)
/// - `GET  /shorten/{alias}`         - Redirect (public)
/// - `GET  /analytics/overall`       - Caller's analytics (auth)
/// - `GET  /analytics/topic/{topic}` - Topic analytics (auth)
/// - `GET  /analytics/{alias}`       - Alias analytics (auth)
///
/// The burst limiter wraps creation and analytics only. Redirects stay
/// unthrottled.
pub fn routes(state: AppState) -> Router<AppState> {
    let burst = rate_limit::burst_layer(state.behind_proxy);

    let create = Router::new()
        .route("/shorten", post(shorten_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::creation_layer,
        ))
        .layer(burst.clone());

    let analytics = Router::new()
        .route("/analytics/overall", get(overall_analytics_handler))
        .route("/analytics/topic/{topic}", get(topic_analytics_handler))
        .route("/analytics/{alias}", get(alias_analytics_handler))
        .route_layer(middleware::from_fn_with_state(state, auth::layer))
        .layer(burst);

    Router::new()
        .route("/shorten/{alias}", get(redirect_handler))
        .merge(create)
        .merge(analytics)
}

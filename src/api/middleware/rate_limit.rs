//! Rate limiting middleware.
//!
//! Two layers protect the service:
//!
//! - [`creation_layer`] applies the configured per-client window to alias
//!   creation and answers `429` with `Retry-After` when it is exhausted.
//! - [`burst_layer`] is a coarse token bucket on the `/api` creation and
//!   analytics routes that absorbs request floods before they reach the store.
//!   Redirects are never throttled.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use metrics::counter;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder, key_extractor::KeyExtractor,
};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Keys requests by caller IP, honouring proxy headers when configured.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor {
    behind_proxy: bool,
}

impl ClientIpKeyExtractor {
    pub fn new(behind_proxy: bool) -> Self {
        Self { behind_proxy }
    }
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = String;

    fn extract<T>(&self, req: &axum::http::Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr)
            .ok_or(GovernorError::UnableToExtractKey)?;

        Ok(client_ip(req.headers(), peer, self.behind_proxy))
    }
}

/// Token bucket for the authenticated `/api` routes.
///
/// # Limits
///
/// - **Replenish**: one request every 2 seconds
/// - **Burst**: 100 requests
pub fn burst_layer(
    behind_proxy: bool,
) -> GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(100)
            .key_extractor(ClientIpKeyExtractor::new(behind_proxy))
            .finish()
            .expect("burst limiter period and size are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Applies the per-client creation window from [`AppState::rate_limiter`].
///
/// # Errors
///
/// Returns `429 Too Many Requests` carrying the seconds until the oldest
/// request in the window expires.
pub async fn creation_layer(
    State(st): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_ip(req.headers(), peer, st.behind_proxy);
    let decision = st.rate_limiter.check(&key).await;

    if !decision.allowed {
        counter!("rate_limit_rejections_total").increment(1);
        info!(client = %key, "Alias creation rate limited");

        let retry_after = decision.retry_after;
        let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);

        return Err(AppError::rate_limited(
            "Too many requests, please try again later.",
            secs.max(1),
        ));
    }

    Ok(next.run(req).await)
}

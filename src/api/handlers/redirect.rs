//! Handler for alias redirects.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::net::SocketAddr;

use crate::application::services::RequestContext;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Redirects an alias to its original URL.
///
/// # Endpoints
///
/// `GET /{alias}` and `GET /api/shorten/{alias}`
///
/// The click is recorded before the response is sent, with the caller's
/// User-Agent and IP address.
///
/// # Response
///
/// `302 Found` with `Location` set to the original URL.
///
/// # Errors
///
/// Returns 404 Not Found if the alias doesn't exist.
pub async fn redirect_handler(
    Path(alias): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    let context = RequestContext {
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        ip_address: Some(client_ip(&headers, addr, state.behind_proxy)),
    };

    let original_url = state
        .redirect_service
        .handle_redirect(&alias, context)
        .await?;

    let location = HeaderValue::try_from(original_url.as_str()).map_err(|e| {
        AppError::internal(
            "Stored URL is not a valid Location header",
            json!({ "alias": alias, "reason": e.to_string() }),
        )
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

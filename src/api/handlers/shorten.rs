//! Handler for alias creation.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::domain::entities::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Creates an alias owned by the authenticated caller.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/long", "customAlias": "promo", "topic": "sales" }
/// ```
///
/// # Response
///
/// `201 Created` for a new alias, `200 OK` when an existing alias of the
/// caller was reused:
///
/// ```json
/// {
///   "alias": "promo",
///   "shortUrl": "http://localhost:3000/promo",
///   "originalUrl": "https://example.com/long",
///   "createdAt": "2024-06-15T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - **400**: malformed body, missing URL or invalid alias/topic
/// - **409**: custom alias already taken
pub async fn shorten_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload.map_err(|e| {
        AppError::bad_request("Invalid request body", json!({ "reason": e.body_text() }))
    })?;
    payload.validate()?;

    let created = state.alias_service.create(payload.into(), &identity).await?;

    let status = if created.reused {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(created.into())))
}

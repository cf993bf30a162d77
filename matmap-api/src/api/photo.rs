//! Place photo proxy
//!
//! Streams provider photos to the browser so the provider API key never
//! leaves the server.

use axum::{
    body::Body,
    extract::{Query, State},
    http::header,
    response::Response,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::{ApiError, ApiResult, AppState};

/// Query parameters for a photo
#[derive(Debug, Deserialize)]
pub struct PhotoQuery {
    /// Reference from a restaurant's `photo_reference`
    pub photo_reference: Option<String>,
    /// Requested width in pixels (server default when absent)
    pub maxwidth: Option<u32>,
}

/// GET /api/restaurants/photo?photo_reference=...&maxwidth=400
pub async fn get_photo(
    State(state): State<AppState>,
    Query(query): Query<PhotoQuery>,
) -> ApiResult<Response> {
    let reference = query
        .photo_reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::BadRequest("photo_reference is required".to_string()))?;

    let max_width = query.maxwidth.unwrap_or(state.photo_max_width);
    if max_width == 0 {
        return Err(ApiError::BadRequest("maxwidth must be positive".to_string()));
    }

    tracing::debug!(max_width, "Proxying place photo");

    let photo = state.places.photo(reference, max_width).await?;

    let content_type = photo
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from_stream(photo.body))
        .map_err(|e| ApiError::Internal(format!("Failed to build photo response: {}", e)))
}

/// Build photo proxy routes
pub fn photo_routes() -> Router<AppState> {
    Router::new().route("/api/restaurants/photo", get(get_photo))
}

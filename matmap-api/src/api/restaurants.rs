//! Restaurant recommendation endpoints
//!
//! - `POST /api/restaurants/recommend`: quiz answers → ranked restaurants
//! - `GET /api/restaurants/keywords`: answer tokens the active table understands

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use matmap_common::{Category, KeywordEntry};

use crate::places::{Coordinates, PlaceRecord};
use crate::search::search_restaurants;
use crate::{ApiError, ApiResult, AppState};

/// Request payload for a recommendation
///
/// **Request:** `{"answers": ["korean", "spicy", "near"], "location": {"latitude": 37.56, "longitude": 126.97}}`
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    /// Quiz answer tokens, in the order they were chosen
    #[serde(default)]
    pub answers: Vec<String>,
    /// Caller position, used as the search center
    #[serde(default)]
    pub location: Option<Coordinates>,
}

/// One restaurant as returned to the UI
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantSummary {
    pub id: String,
    pub name: String,
    pub category: String,
    pub address: String,
    /// Longitude
    pub x: f64,
    /// Latitude
    pub y: f64,
    pub url: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub photo_reference: Option<String>,
}

impl From<PlaceRecord> for RestaurantSummary {
    fn from(place: PlaceRecord) -> Self {
        Self {
            id: place.id,
            name: place.name,
            category: place.category,
            address: place.address,
            x: place.location.longitude,
            y: place.location.latitude,
            url: place.url,
            rating: place.rating,
            user_ratings_total: place.user_ratings_total,
            photo_reference: place.photo_reference,
        }
    }
}

/// Response payload for a recommendation
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub success: bool,
    /// Query the results came from
    pub query: String,
    /// Search radius in meters
    pub radius: u32,
    /// Whether the shorter retry query produced these results
    pub fallback_used: bool,
    pub restaurants: Vec<RestaurantSummary>,
}

/// POST /api/restaurants/recommend
///
/// **Errors:**
/// - 400 Bad Request: location out of range
/// - 500 Internal Server Error: provider API key not configured
/// - 502 Bad Gateway: provider failure
///
/// No matching restaurants is a success with an empty list.
pub async fn recommend(
    State(state): State<AppState>,
    Json(payload): Json<RecommendRequest>,
) -> ApiResult<Json<RecommendResponse>> {
    if let Some(location) = payload.location {
        if !location.is_valid() {
            return Err(ApiError::BadRequest(format!(
                "Location out of range: latitude {}, longitude {}",
                location.latitude, location.longitude
            )));
        }
    }

    let outcome = search_restaurants(
        &state.composer,
        state.places.as_ref(),
        &payload.answers,
        payload.location,
    )
    .await?;

    let executed = outcome.executed();
    let query = executed.query.clone();
    let radius = executed.radius;
    let fallback_used = outcome.fallback.is_some();

    Ok(Json(RecommendResponse {
        success: true,
        query,
        radius,
        fallback_used,
        restaurants: outcome.places.into_iter().map(Into::into).collect(),
    }))
}

/// Answer tokens of one category
#[derive(Debug, Serialize)]
pub struct KeywordGroup {
    pub category: Category,
    pub keywords: Vec<KeywordEntry>,
}

#[derive(Debug, Serialize)]
pub struct KeywordsResponse {
    pub success: bool,
    pub groups: Vec<KeywordGroup>,
}

/// GET /api/restaurants/keywords
///
/// Lists the active keyword table grouped by category so the quiz can be
/// rendered from it.
pub async fn list_keywords(State(state): State<AppState>) -> Json<KeywordsResponse> {
    let table = state.composer.table();

    let groups = Category::ALL
        .iter()
        .map(|&category| KeywordGroup {
            category,
            keywords: table.by_category(category).cloned().collect(),
        })
        .filter(|group| !group.keywords.is_empty())
        .collect();

    Json(KeywordsResponse {
        success: true,
        groups,
    })
}

/// Build restaurant routes
pub fn restaurant_routes() -> Router<AppState> {
    Router::new()
        .route("/api/restaurants/recommend", post(recommend))
        .route("/api/restaurants/keywords", get(list_keywords))
}

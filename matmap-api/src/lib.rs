//! matmap-api library interface
//!
//! Restaurant recommendation service: composes quiz answers into a place
//! search, proxies the place-search provider, and streams place photos.

pub mod api;
pub mod error;
pub mod logging;
pub mod places;
pub mod search;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use matmap_common::QueryComposer;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::places::PlaceSearch;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Query composer built once at startup
    pub composer: Arc<QueryComposer>,
    /// Place-search provider
    pub places: Arc<dyn PlaceSearch>,
    /// Photo width used when the client does not ask for one
    pub photo_max_width: u32,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(composer: QueryComposer, places: Arc<dyn PlaceSearch>, photo_max_width: u32) -> Self {
        Self {
            composer: Arc::new(composer),
            places,
            photo_max_width,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::restaurant_routes())
        .merge(api::photo_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

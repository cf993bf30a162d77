//! Google Places client
//!
//! Uses the Places Text Search and Place Photo web services. The API key stays
//! on the server; clients only ever see photo references.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;

use matmap_common::config::PlacesConfig;

use super::{
    Coordinates, PlacePhoto, PlaceRecord, PlaceSearch, PlacesError, TextSearchRequest,
};

const USER_AGENT: &str = concat!("MatMap/", env!("CARGO_PKG_VERSION"));
/// Largest location-bias radius the Text Search service accepts
pub const MAX_BIAS_RADIUS_M: u32 = 50_000;
/// Largest photo width the Place Photo service serves
pub const MAX_PHOTO_WIDTH: u32 = 1_600;

/// Types too generic to describe a venue
const GENERIC_TYPES: [&str; 3] = ["point_of_interest", "establishment", "food"];

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<GooglePlace>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GooglePlace {
    place_id: String,
    name: String,
    #[serde(default)]
    types: Vec<String>,
    formatted_address: Option<String>,
    geometry: Option<Geometry>,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
    #[serde(default)]
    photos: Vec<GooglePhoto>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GooglePhoto {
    photo_reference: String,
}

impl GooglePlace {
    fn into_record(self, fallback_category: &str) -> Option<PlaceRecord> {
        let Some(geometry) = self.geometry else {
            tracing::debug!(place_id = %self.place_id, "Skipping place without geometry");
            return None;
        };

        let category = self
            .types
            .iter()
            .find(|t| !GENERIC_TYPES.contains(&t.as_str()))
            .cloned()
            .unwrap_or_else(|| fallback_category.to_string());

        Some(PlaceRecord {
            url: maps_url(&self.place_id),
            id: self.place_id,
            name: self.name,
            category,
            address: self.formatted_address.unwrap_or_default(),
            location: Coordinates {
                latitude: geometry.location.lat,
                longitude: geometry.location.lng,
            },
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            photo_reference: self.photos.into_iter().next().map(|p| p.photo_reference),
        })
    }
}

/// Transport failure without the request URL, which carries the API key
fn network_error(e: reqwest::Error) -> PlacesError {
    PlacesError::Network(e.without_url().to_string())
}

/// Google Maps link for a place id
pub fn maps_url(place_id: &str) -> String {
    format!("https://www.google.com/maps/place/?q=place_id:{}", place_id)
}

fn into_records(
    response: TextSearchResponse,
    fallback_category: &str,
) -> Result<Vec<PlaceRecord>, PlacesError> {
    match response.status.as_str() {
        "OK" => Ok(response
            .results
            .into_iter()
            .filter_map(|p| p.into_record(fallback_category))
            .collect()),
        "ZERO_RESULTS" => Ok(Vec::new()),
        _ => Err(PlacesError::Provider {
            status: response.status,
            message: response.error_message.unwrap_or_default(),
        }),
    }
}

/// Google Places API client
pub struct GooglePlacesClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    language: String,
    region: String,
}

impl GooglePlacesClient {
    pub fn new(config: &PlacesConfig) -> Result<Self, PlacesError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(network_error)?;

        let api_key = config.usable_api_key().map(str::to_string);

        if api_key.is_none() {
            tracing::warn!("Places API key not configured; search requests will fail");
        }

        Ok(Self {
            http_client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            region: config.region.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, PlacesError> {
        self.api_key.as_deref().ok_or(PlacesError::MissingApiKey)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PlacesError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(PlacesError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    fn provider_id(&self) -> &'static str {
        "google-places"
    }

    async fn text_search(
        &self,
        request: &TextSearchRequest,
    ) -> Result<Vec<PlaceRecord>, PlacesError> {
        let api_key = self.api_key()?;
        let url = format!("{}/textsearch/json", self.base_url);

        let mut params: Vec<(&str, String)> = vec![
            ("query", request.query.clone()),
            ("type", request.place_type.clone()),
            ("language", self.language.clone()),
            ("region", self.region.clone()),
        ];

        if let Some(bias) = request.location {
            let radius = bias.radius_m.min(MAX_BIAS_RADIUS_M);
            if radius < bias.radius_m {
                tracing::debug!(
                    requested = bias.radius_m,
                    radius,
                    "Clamped location bias radius"
                );
            }
            params.push((
                "location",
                format!("{},{}", bias.center.latitude, bias.center.longitude),
            ));
            params.push(("radius", radius.to_string()));
        }

        tracing::debug!(query = %request.query, place_type = %request.place_type, "Querying Places text search");

        params.push(("key", api_key.to_string()));

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(network_error)?;

        let response: TextSearchResponse = Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| PlacesError::Parse(e.without_url().to_string()))?;

        into_records(response, &request.place_type)
    }

    async fn photo(&self, photo_reference: &str, max_width: u32) -> Result<PlacePhoto, PlacesError> {
        let api_key = self.api_key()?;
        let url = format!("{}/photo", self.base_url);
        let max_width = max_width.clamp(1, MAX_PHOTO_WIDTH);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("maxwidth", max_width.to_string()),
                ("photo_reference", photo_reference.to_string()),
                ("key", api_key.to_string()),
            ])
            .send()
            .await
            .map_err(network_error)?;

        let response = Self::check_status(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(network_error))
            .boxed();

        Ok(PlacePhoto { content_type, body })
    }
}

//! Place-search provider seam
//!
//! The search path only talks to [`PlaceSearch`]. [`GooglePlacesClient`] is the
//! production implementation; tests substitute scripted providers.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod google;

pub use google::GooglePlacesClient;

/// Place-search errors
#[derive(Debug, Error)]
pub enum PlacesError {
    /// No usable API key configured
    #[error("Place search API key not configured")]
    MissingApiKey,

    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx HTTP response
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// 2xx response carrying a provider error status
    #[error("Provider returned {status}: {message}")]
    Provider { status: String, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A point on the map (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Latitude within ±90 and longitude within ±180
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Circular location bias
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationBias {
    pub center: Coordinates,
    pub radius_m: u32,
}

/// Text search request sent to the provider
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearchRequest {
    pub query: String,
    /// Provider place type (`restaurant`, `cafe`)
    pub place_type: String,
    pub location: Option<LocationBias>,
}

/// One place returned by the provider
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    pub id: String,
    pub name: String,
    pub category: String,
    pub address: String,
    pub location: Coordinates,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub photo_reference: Option<String>,
    /// Link to the place on the provider's map
    pub url: String,
}

/// Photo bytes streamed from the provider
pub struct PlacePhoto {
    pub content_type: Option<String>,
    pub body: BoxStream<'static, Result<Bytes, PlacesError>>,
}

/// Place-search provider
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Provider identifier for logs
    fn provider_id(&self) -> &'static str;

    /// Ranked places for a text query. Zero matches is `Ok(vec![])`.
    async fn text_search(&self, request: &TextSearchRequest)
        -> Result<Vec<PlaceRecord>, PlacesError>;

    /// Photo for a reference previously returned in a [`PlaceRecord`]
    async fn photo(&self, photo_reference: &str, max_width: u32)
        -> Result<PlacePhoto, PlacesError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validation() {
        let seoul = Coordinates {
            latitude: 37.5665,
            longitude: 126.978,
        };
        assert!(seoul.is_valid());

        let bad_lat = Coordinates {
            latitude: 91.0,
            longitude: 0.0,
        };
        assert!(!bad_lat.is_valid());

        let bad_lon = Coordinates {
            latitude: 0.0,
            longitude: -180.5,
        };
        assert!(!bad_lon.is_valid());

        let nan = Coordinates {
            latitude: f64::NAN,
            longitude: 0.0,
        };
        assert!(!nan.is_valid());
    }
}

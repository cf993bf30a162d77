//! Shared test helpers: a scripted place-search provider and log capture

#![allow(dead_code)]

pub mod log_capture;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use matmap_api::places::{
    Coordinates, PlacePhoto, PlaceRecord, PlaceSearch, PlacesError, TextSearchRequest,
};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Provider that replays scripted responses and records every request
///
/// Once the script runs out every further search returns zero results.
pub struct ScriptedPlaces {
    responses: Mutex<VecDeque<Result<Vec<PlaceRecord>, PlacesError>>>,
    requests: Mutex<Vec<TextSearchRequest>>,
    photo_requests: Mutex<Vec<(String, u32)>>,
}

impl ScriptedPlaces {
    pub fn new(responses: Vec<Result<Vec<PlaceRecord>, PlacesError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            photo_requests: Mutex::new(Vec::new()),
        }
    }

    /// Provider that always finds nothing
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn requests(&self) -> Vec<TextSearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn photo_requests(&self) -> Vec<(String, u32)> {
        self.photo_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaceSearch for ScriptedPlaces {
    fn provider_id(&self) -> &'static str {
        "scripted"
    }

    async fn text_search(
        &self,
        request: &TextSearchRequest,
    ) -> Result<Vec<PlaceRecord>, PlacesError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn photo(&self, photo_reference: &str, max_width: u32) -> Result<PlacePhoto, PlacesError> {
        self.photo_requests
            .lock()
            .unwrap()
            .push((photo_reference.to_string(), max_width));

        if photo_reference == "missing" {
            return Err(PlacesError::Api {
                status: 404,
                message: "not found".to_string(),
            });
        }

        let chunks: Vec<Result<Bytes, PlacesError>> = vec![
            Ok(Bytes::from_static(b"\xff\xd8\xff")),
            Ok(Bytes::from_static(b"jpeg-body")),
        ];
        Ok(PlacePhoto {
            content_type: Some("image/jpeg".to_string()),
            body: stream::iter(chunks).boxed(),
        })
    }
}

/// Place record with plausible Seoul data
pub fn place(id: &str, name: &str) -> PlaceRecord {
    PlaceRecord {
        id: id.to_string(),
        name: name.to_string(),
        category: "restaurant".to_string(),
        address: "서울특별시 중구 세종대로 110".to_string(),
        location: Coordinates {
            latitude: 37.5663,
            longitude: 126.9779,
        },
        rating: Some(4.5),
        user_ratings_total: Some(120),
        photo_reference: Some(format!("photo-{}", id)),
        url: format!("https://www.google.com/maps/place/?q=place_id:{}", id),
    }
}

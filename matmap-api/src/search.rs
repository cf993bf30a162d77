//! Restaurant search: compose, query the provider, retry once on zero results

use matmap_common::{ComposedQuery, QueryComposer};
use tracing::{info, warn};

use crate::places::{
    Coordinates, LocationBias, PlaceRecord, PlaceSearch, PlacesError, TextSearchRequest,
};

/// Result of one restaurant search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Query composed from the answers
    pub composed: ComposedQuery,
    /// Shorter query used for the retry, if one was issued
    pub fallback: Option<ComposedQuery>,
    pub places: Vec<PlaceRecord>,
}

impl SearchOutcome {
    /// Query whose results are in `places`
    pub fn executed(&self) -> &ComposedQuery {
        self.fallback.as_ref().unwrap_or(&self.composed)
    }
}

fn text_search_request(composed: &ComposedQuery, location: Option<Coordinates>) -> TextSearchRequest {
    TextSearchRequest {
        query: composed.query.clone(),
        place_type: composed.venue.place_type().to_string(),
        location: location.map(|center| LocationBias {
            center,
            radius_m: composed.radius,
        }),
    }
}

/// Search for restaurants matching the quiz answers
///
/// Issues at most two provider calls: the composed query and, when it returns
/// nothing and more than one keyword group contributed, one shorter retry.
/// Zero results after the retry is a successful empty outcome.
pub async fn search_restaurants(
    composer: &QueryComposer,
    provider: &dyn PlaceSearch,
    answers: &[String],
    location: Option<Coordinates>,
) -> Result<SearchOutcome, PlacesError> {
    let composed = composer.compose(answers);

    info!(
        provider = provider.provider_id(),
        query = %composed.query,
        radius = composed.radius,
        groups = composed.parts.len(),
        located = location.is_some(),
        "Searching restaurants"
    );

    let places = provider
        .text_search(&text_search_request(&composed, location))
        .await?;

    if !places.is_empty() {
        info!(results = places.len(), "Search complete");
        return Ok(SearchOutcome {
            composed,
            fallback: None,
            places,
        });
    }

    let Some(fallback) = composer.fallback(&composed) else {
        info!(query = %composed.query, "No results");
        return Ok(SearchOutcome {
            composed,
            fallback: None,
            places,
        });
    };

    warn!(
        query = %composed.query,
        fallback = %fallback.query,
        "No results, retrying with shorter query"
    );

    let places = provider
        .text_search(&text_search_request(&fallback, location))
        .await?;

    info!(results = places.len(), "Fallback search complete");

    Ok(SearchOutcome {
        composed,
        fallback: Some(fallback),
        places,
    })
}

//! Query composition
//!
//! Turns an ordered set of quiz answers into a search phrase and radius for the
//! place-search provider.
//!
//! # Algorithm
//!
//! 1. Look up every answer token; unknown and repeated tokens are skipped.
//! 2. Bucket the matched entries by [`Category`], keeping first-seen order.
//! 3. Pick the [`SlotRule`] for the venue kind. The venue is a café when the
//!    first cuisine answer is flagged `cafe`, otherwise a restaurant.
//! 4. Each slot of the rule contributes the primary phrase of the first entry in
//!    its bucket. These contributions are the query `parts`.
//! 5. The first distance answer picks the radius; no distance answer means the
//!    default radius.
//! 6. No parts gives the generic term. Otherwise the parts are joined and a
//!    venue suffix is appended unless one is already present.
//!
//! Composition is pure: the same answers always give the same [`ComposedQuery`].
//!
//! # Fallback
//!
//! [`QueryComposer::fallback`] gives the single retry used when a search comes
//! back empty. It only exists when more than one part contributed, and keeps the
//! first `min(2, parts - 1)` parts so the retry is always strictly shorter.

use serde::Serialize;
use std::collections::HashSet;

use crate::keywords::{Category, KeywordEntry, KeywordTable, Reach};

/// Venue kind searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueKind {
    Restaurant,
    Cafe,
}

impl VenueKind {
    /// Place type understood by the place-search provider
    pub fn place_type(&self) -> &'static str {
        match self {
            VenueKind::Restaurant => "restaurant",
            VenueKind::Cafe => "cafe",
        }
    }
}

/// Which categories fill the query, in order, for one venue kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRule {
    pub venue: VenueKind,
    pub slots: Vec<Category>,
}

/// Product policy for building search phrases
#[derive(Debug, Clone)]
pub struct CompositionPolicy {
    /// Slot rules, first matching venue wins. Cafés without a rule of their
    /// own use the restaurant rule.
    pub rules: Vec<SlotRule>,
    /// Query used when no answer contributes a phrase
    pub generic_term: String,
    /// Suffix appended to restaurant queries
    pub restaurant_suffix: String,
    /// Suffix appended to café queries
    pub cafe_suffix: String,
    /// Endings that already name a venue type
    pub venue_suffixes: Vec<String>,
    /// Parts kept by the fallback query at most
    pub fallback_parts: usize,
    pub near_radius_m: u32,
    pub far_radius_m: u32,
    pub default_radius_m: u32,
}

pub const DEFAULT_NEAR_RADIUS_M: u32 = 3_000;
pub const DEFAULT_FAR_RADIUS_M: u32 = 80_000;
pub const DEFAULT_RADIUS_M: u32 = 20_000;

impl Default for CompositionPolicy {
    fn default() -> Self {
        Self {
            rules: vec![
                SlotRule {
                    venue: VenueKind::Cafe,
                    slots: vec![Category::Cuisine, Category::Style],
                },
                SlotRule {
                    venue: VenueKind::Restaurant,
                    slots: vec![Category::Cuisine, Category::Ingredient, Category::Flavor],
                },
            ],
            generic_term: "맛집".to_string(),
            restaurant_suffix: "맛집".to_string(),
            cafe_suffix: "카페".to_string(),
            venue_suffixes: ["맛집", "식당", "카페", "레스토랑", "음식점"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fallback_parts: 2,
            near_radius_m: DEFAULT_NEAR_RADIUS_M,
            far_radius_m: DEFAULT_FAR_RADIUS_M,
            default_radius_m: DEFAULT_RADIUS_M,
        }
    }
}

impl CompositionPolicy {
    fn rule_for(&self, venue: VenueKind) -> Option<&SlotRule> {
        self.rules.iter().find(|r| r.venue == venue)
    }

    /// Slots for `venue`. A venue without its own rule uses the restaurant
    /// rule; with no rule at all nothing contributes.
    fn slots_for(&self, venue: VenueKind) -> &[Category] {
        self.rule_for(venue)
            .or_else(|| self.rule_for(VenueKind::Restaurant))
            .map(|r| r.slots.as_slice())
            .unwrap_or(&[])
    }

    fn radius_for(&self, reach: Option<Reach>) -> u32 {
        match reach {
            Some(Reach::Near) => self.near_radius_m,
            Some(Reach::Far) => self.far_radius_m,
            None => self.default_radius_m,
        }
    }

    fn phrase(&self, parts: &[String], venue: VenueKind) -> String {
        if parts.is_empty() {
            return self.generic_term.clone();
        }

        let mut phrase = parts.join(" ");
        let has_suffix = self
            .venue_suffixes
            .iter()
            .any(|s| phrase.ends_with(s.as_str()));

        if !has_suffix {
            let suffix = match venue {
                VenueKind::Restaurant => &self.restaurant_suffix,
                VenueKind::Cafe => &self.cafe_suffix,
            };
            phrase.push(' ');
            phrase.push_str(suffix);
        }

        phrase
    }
}

/// Search phrase and radius for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedQuery {
    pub query: String,
    /// Search radius in meters
    pub radius: u32,
    pub venue: VenueKind,
    /// Phrases that contributed to `query`, in slot order
    pub parts: Vec<String>,
}

/// Composes quiz answers into search queries
///
/// Owns the keyword table and policy; build once and share.
#[derive(Debug, Clone)]
pub struct QueryComposer {
    table: KeywordTable,
    policy: CompositionPolicy,
}

impl QueryComposer {
    pub fn new(table: KeywordTable, policy: CompositionPolicy) -> Self {
        Self { table, policy }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    pub fn policy(&self) -> &CompositionPolicy {
        &self.policy
    }

    /// Compose a query from quiz answers
    pub fn compose<S: AsRef<str>>(&self, answers: &[S]) -> ComposedQuery {
        let mut buckets: [Vec<&KeywordEntry>; 5] = Default::default();
        let mut seen = HashSet::new();

        for answer in answers {
            let token = answer.as_ref().trim();
            if !seen.insert(token) {
                continue;
            }
            if let Some(entry) = self.table.get(token) {
                buckets[entry.category.index()].push(entry);
            }
        }

        let venue = match buckets[Category::Cuisine.index()].first() {
            Some(entry) if entry.cafe => VenueKind::Cafe,
            _ => VenueKind::Restaurant,
        };

        let parts: Vec<String> = self
            .policy
            .slots_for(venue)
            .iter()
            .filter_map(|category| buckets[category.index()].first())
            .filter_map(|entry| entry.primary_phrase())
            .map(str::to_string)
            .collect();

        let reach = buckets[Category::Distance.index()]
            .first()
            .and_then(|entry| entry.reach);

        ComposedQuery {
            query: self.policy.phrase(&parts, venue),
            radius: self.policy.radius_for(reach),
            venue,
            parts,
        }
    }

    /// Shorter query for the single zero-result retry
    ///
    /// Returns `None` when at most one part contributed.
    pub fn fallback(&self, composed: &ComposedQuery) -> Option<ComposedQuery> {
        let count = composed.parts.len();
        if count <= 1 {
            return None;
        }

        let keep = self.policy.fallback_parts.min(count - 1).max(1);
        let parts = composed.parts[..keep].to_vec();

        Some(ComposedQuery {
            query: self.policy.phrase(&parts, composed.venue),
            radius: composed.radius,
            venue: composed.venue,
            parts,
        })
    }
}

impl Default for QueryComposer {
    fn default() -> Self {
        Self::new(KeywordTable::builtin(), CompositionPolicy::default())
    }
}

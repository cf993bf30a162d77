//! # MatMap Common Library
//!
//! Shared code for the MatMap services:
//! - Quiz keyword table (answer token → category + search phrases)
//! - Query composition policy and the query composer
//! - Bootstrap configuration loading
//! - Common error type

pub mod compose;
pub mod config;
pub mod error;
pub mod keywords;

pub use compose::{ComposedQuery, CompositionPolicy, QueryComposer, SlotRule, VenueKind};
pub use error::{Error, Result};
pub use keywords::{Category, KeywordEntry, KeywordTable, Reach};

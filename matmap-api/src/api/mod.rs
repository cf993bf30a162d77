//! HTTP API handlers for matmap-api

pub mod health;
pub mod photo;
pub mod restaurants;

pub use health::health_routes;
pub use photo::photo_routes;
pub use restaurants::restaurant_routes;

//! Weather data pipeline for Cirrus
//!
//! Fetches forecasts and geocoding data from the Open-Meteo API, normalizes
//! raw JSON into canonical snapshots, derives display conditions, and keeps
//! a TTL cache with request coalescing.

pub mod alert;
pub mod cache;
pub mod client;
pub mod condition;
pub mod geocode;
pub mod hourly;
pub mod location;
pub mod types;

pub use cache::{FetchCache, WeatherCache, WeatherKey};
pub use client::WeatherClient;
pub use condition::WeatherCondition;
pub use geocode::GeocodingClient;
pub use location::{detect_location, DetectedLocation, LocationSource};
pub use types::*;

//! Air-quality service for Cirrus
//!
//! Fetches current and hourly pollutant data, classifies the European AQI
//! into severity tiers, and provides the fixed health-advice lookup.

pub mod client;
pub mod types;

pub use client::AirQualityClient;
pub use types::*;

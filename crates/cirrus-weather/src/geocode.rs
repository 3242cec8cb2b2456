//! Geocoding: free-text location search and reverse lookup.
//!
//! Reverse lookup never fails from the caller's point of view: any error or
//! empty result set falls back to a coordinate-formatted display name.

use std::time::Duration;

use serde::Deserialize;

use crate::types::{Coordinates, GeocodingResult, WeatherError};

const SEARCH_PATH: &str = "/v1/search";
const REVERSE_PATH: &str = "/v1/reverse";
const RESULT_LIMIT: u8 = 10;

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<RawPlace>>,
}

#[derive(Debug, Deserialize)]
struct RawPlace {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
    admin2: Option<String>,
    admin3: Option<String>,
}

impl GeocodingClient {
    /// Create a client against the given base URL.
    ///
    /// # Errors
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search locations by free-text name, capped at 10 results.
    ///
    /// An empty or whitespace-only query short-circuits to an empty list
    /// without touching the network.
    ///
    /// # Errors
    /// `WeatherError::Api` on non-2xx, `WeatherError::Shape` on bad payloads.
    pub async fn search_locations(
        &self,
        query: &str,
    ) -> Result<Vec<GeocodingResult>, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}{}?name={}&count={}&language=en",
            self.base_url,
            SEARCH_PATH,
            urlencoding::encode(query),
            RESULT_LIMIT,
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Shape(e.to_string()))?;

        Ok(body
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|place| GeocodingResult {
                name: place.name,
                latitude: place.latitude,
                longitude: place.longitude,
                country: place.country,
                admin1: place.admin1,
                admin2: place.admin2,
                admin3: place.admin3,
            })
            .collect())
    }

    /// Reverse geocode coordinates to a display name.
    ///
    /// Falls back to `"Location (lat, lon)"` on any failure or empty result
    /// set; the error is logged, never surfaced.
    pub async fn reverse_geocode(&self, coords: &Coordinates) -> String {
        match self.try_reverse(coords).await {
            Ok(Some(name)) => name,
            Ok(None) => {
                tracing::debug!("Reverse geocode returned no results");
                coordinate_label(coords)
            }
            Err(e) => {
                tracing::warn!("Reverse geocode failed: {}", e);
                coordinate_label(coords)
            }
        }
    }

    async fn try_reverse(&self, coords: &Coordinates) -> Result<Option<String>, WeatherError> {
        let url = format!(
            "{}{}?latitude={}&longitude={}&language=en",
            self.base_url, REVERSE_PATH, coords.latitude, coords.longitude,
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Shape(e.to_string()))?;

        Ok(body
            .results
            .unwrap_or_default()
            .first()
            .map(display_name))
    }
}

/// Most specific available display name: the base name plus the finest
/// administrative qualifier present, in priority order admin3 > admin2 >
/// admin1.
fn display_name(place: &RawPlace) -> String {
    let admin = [&place.admin3, &place.admin2, &place.admin1]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .find(|a| !a.is_empty());

    match admin {
        Some(a) if a != place.name => format!("{}, {}", place.name, a),
        _ => place.name.clone(),
    }
}

/// Coordinate-formatted fallback name, rounded to 4 decimal places.
pub fn coordinate_label(coords: &Coordinates) -> String {
    format!(
        "Location ({:.4}, {:.4})",
        coords.latitude, coords.longitude
    )
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use cirrus_core::TemperatureUnit;

/// Geographic coordinates in floating-point degrees.
///
/// Immutable once fetched; construction validates finiteness and range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build validated coordinates.
    ///
    /// # Errors
    /// Returns `WeatherError::InvalidCoordinates` for non-finite values or
    /// degrees outside [-90, 90] / [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(WeatherError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Result of a location search.
///
/// admin1..admin3 are optional administrative-region qualifiers used only
/// for display disambiguation (admin3 is the finest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub admin1: Option<String>,
    pub admin2: Option<String>,
    pub admin3: Option<String>,
}

/// Current conditions. One instance per fetch, superseded wholesale on
/// refetch; never partially merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub weather_code: i32,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub is_day: bool,
    pub precipitation: f64,
    pub cloud_cover: f64,
    pub uv_index: f64,
}

/// Hourly series as parallel arrays; the index is the join key across all
/// fields. All arrays have identical length (enforced at fetch time).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    pub time: Vec<DateTime<Utc>>,
    pub temperature: Vec<f64>,
    pub weather_code: Vec<i32>,
    pub precipitation_probability: Vec<f64>,
    pub is_day: Vec<bool>,
}

impl HourlyForecast {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Daily series; same parallel-array model as the hourly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub time: Vec<NaiveDate>,
    pub weather_code: Vec<i32>,
    pub temperature_max: Vec<f64>,
    pub temperature_min: Vec<f64>,
    pub precipitation_probability_max: Vec<f64>,
    pub sunrise: Vec<DateTime<Utc>>,
    pub sunset: Vec<DateTime<Utc>>,
    pub uv_index_max: Vec<f64>,
}

impl DailyForecast {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Complete result of one forecast fetch.
///
/// The temperature unit is baked into the numeric values at fetch time;
/// changing the unit requires a new fetch (the cache key includes it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub unit: TemperatureUnit,
    pub current: CurrentWeather,
    pub hourly: HourlyForecast,
    pub daily: DailyForecast,
    pub fetched_at: DateTime<Utc>,
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Malformed weather data: {0}")]
    Shape(String),
    #[error("Invalid coordinates: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

impl WeatherError {
    /// User-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Network(_) => "Unable to reach the weather service. Check your connection.",
            WeatherError::Api { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            WeatherError::Api { .. } => "The weather request failed. Please try again.",
            WeatherError::Shape(_) => "Received unexpected weather data. Please try again.",
            WeatherError::InvalidCoordinates { .. } => "That location is not valid.",
        }
    }

    /// Whether a retry is worth attempting.
    pub fn retry_decision(&self) -> cirrus_core::RetryDecision {
        use cirrus_core::retry::{is_retryable_error, is_retryable_status};
        use cirrus_core::RetryDecision;

        match self {
            WeatherError::Network(e) => is_retryable_error(e),
            WeatherError::Api { status, .. } => reqwest::StatusCode::from_u16(*status)
                .map_or(RetryDecision::NoRetry, is_retryable_status),
            WeatherError::Shape(_) | WeatherError::InvalidCoordinates { .. } => {
                RetryDecision::NoRetry
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_coordinates_valid_range() {
        assert!(Coordinates::new(52.52, 13.405).is_ok());
        assert!(Coordinates::new(-90.0, 180.0).is_ok());
        assert!(Coordinates::new(90.0, -180.0).is_ok());
    }

    #[test]
    fn test_coordinates_out_of_range() {
        assert!(Coordinates::new(90.1, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
    }

    #[test]
    fn test_coordinates_non_finite() {
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
        assert!(Coordinates::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_api_error_user_message_splits_on_status() {
        let server = WeatherError::Api {
            status: 502,
            message: "bad gateway".into(),
        };
        assert!(server.user_message().contains("experiencing issues"));

        let client = WeatherError::Api {
            status: 400,
            message: "bad request".into(),
        };
        assert_eq!(
            client.user_message(),
            "The weather request failed. Please try again."
        );
    }

    #[test]
    fn test_shape_error_is_not_retryable() {
        let err = WeatherError::Shape("length mismatch".into());
        assert_eq!(err.retry_decision(), cirrus_core::RetryDecision::NoRetry);
    }

    #[test]
    fn test_server_error_is_retryable() {
        let err = WeatherError::Api {
            status: 503,
            message: "unavailable".into(),
        };
        assert_eq!(err.retry_decision(), cirrus_core::RetryDecision::Retry);
    }
}

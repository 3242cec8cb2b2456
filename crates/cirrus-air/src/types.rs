use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cirrus_weather::cache::{quantize, FetchCache};
use cirrus_weather::Coordinates;

/// Current pollutant readings. Replaced wholesale per fetch, keyed by
/// coordinates; never merged with a previous snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityCurrent {
    pub time: DateTime<Utc>,
    pub european_aqi: f64,
    pub us_aqi: f64,
    pub pm10: f64,
    pub pm2_5: f64,
    pub carbon_monoxide: f64,
    pub nitrogen_dioxide: f64,
    pub sulphur_dioxide: f64,
    pub ozone: f64,
    /// Only reported for European locations
    pub ammonia: Option<f64>,
    pub dust: Option<f64>,
}

/// Hourly pollutant series; parallel arrays with the index as join key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityHourly {
    pub time: Vec<DateTime<Utc>>,
    pub european_aqi: Vec<f64>,
    pub pm10: Vec<f64>,
    pub pm2_5: Vec<f64>,
}

/// Complete result of one air-quality fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQualityData {
    pub latitude: f64,
    pub longitude: f64,
    pub current: AirQualityCurrent,
    pub hourly: Option<AirQualityHourly>,
    pub fetched_at: DateTime<Utc>,
}

/// Cache key for air-quality fetches: coordinates only, no unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AirKey {
    lat_q: i64,
    lon_q: i64,
}

impl AirKey {
    pub fn new(coords: &Coordinates) -> Self {
        Self {
            lat_q: quantize(coords.latitude),
            lon_q: quantize(coords.longitude),
        }
    }
}

pub type AirCache = FetchCache<AirKey, AirQualityData>;

/// Severity tiers of the European AQI scale.
///
/// Thresholds are the European-AQI-native bands at 20/40/60/80.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirQualityLevel {
    Good,
    Moderate,
    UnhealthySensitive,
    Unhealthy,
    VeryUnhealthy,
}

impl AirQualityLevel {
    /// Classify a European AQI value. Total over f64; values at a boundary
    /// belong to the lower tier.
    pub fn from_european_aqi(value: f64) -> Self {
        if value <= 20.0 {
            Self::Good
        } else if value <= 40.0 {
            Self::Moderate
        } else if value <= 60.0 {
            Self::UnhealthySensitive
        } else if value <= 80.0 {
            Self::Unhealthy
        } else {
            Self::VeryUnhealthy
        }
    }

    /// Ordinal tier, 1 (best) through 5 (worst).
    pub fn tier(self) -> u8 {
        match self {
            Self::Good => 1,
            Self::Moderate => 2,
            Self::UnhealthySensitive => 3,
            Self::Unhealthy => 4,
            Self::VeryUnhealthy => 5,
        }
    }

    /// Human-readable tier name for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthySensitive => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
        }
    }

    /// Badge color for display.
    pub fn color(self) -> &'static str {
        match self {
            Self::Good => "#22c55e",
            Self::Moderate => "#eab308",
            Self::UnhealthySensitive => "#f97316",
            Self::Unhealthy => "#ef4444",
            Self::VeryUnhealthy => "#a855f7",
        }
    }

    /// Fixed advisory strings per tier; not computed from raw
    /// concentrations.
    pub fn health_advice(self) -> HealthAdvice {
        match self {
            Self::Good => HealthAdvice {
                ventilation: "Open windows freely.",
                outdoor: "Air quality is satisfactory for all outdoor activities.",
                sensitive: "No precautions needed.",
            },
            Self::Moderate => HealthAdvice {
                ventilation: "Ventilating is fine for most of the day.",
                outdoor: "Acceptable air for outdoor activities.",
                sensitive: "Unusually sensitive people should watch for symptoms.",
            },
            Self::UnhealthySensitive => HealthAdvice {
                ventilation: "Prefer short ventilation bursts.",
                outdoor: "Consider shortening intense outdoor exercise.",
                sensitive: "Children, elderly and respiratory patients should limit time outdoors.",
            },
            Self::Unhealthy => HealthAdvice {
                ventilation: "Keep windows closed during peak hours.",
                outdoor: "Everyone may begin to experience health effects; reduce exertion.",
                sensitive: "Sensitive groups should stay indoors.",
            },
            Self::VeryUnhealthy => HealthAdvice {
                ventilation: "Keep windows closed; use filtration if available.",
                outdoor: "Avoid outdoor activities.",
                sensitive: "Sensitive groups should avoid any outdoor exposure.",
            },
        }
    }
}

/// Advisory strings shown in the air-quality panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthAdvice {
    pub ventilation: &'static str,
    pub outdoor: &'static str,
    pub sensitive: &'static str,
}

/// Air-quality pipeline errors; same shape as the weather client's.
#[derive(Debug, thiserror::Error)]
pub enum AirError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Air-quality API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Malformed air-quality data: {0}")]
    Shape(String),
}

impl AirError {
    /// User-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AirError::Network(_) => {
                "Unable to reach the air-quality service. Check your connection."
            }
            AirError::Api { status, .. } if *status >= 500 => {
                "The air-quality service is experiencing issues. Please try again later."
            }
            AirError::Api { .. } => "The air-quality request failed. Please try again.",
            AirError::Shape(_) => "Received unexpected air-quality data. Please try again.",
        }
    }

    /// Whether a retry is worth attempting.
    pub fn retry_decision(&self) -> cirrus_core::RetryDecision {
        use cirrus_core::retry::{is_retryable_error, is_retryable_status};
        use cirrus_core::RetryDecision;

        match self {
            AirError::Network(e) => is_retryable_error(e),
            AirError::Api { status, .. } => reqwest::StatusCode::from_u16(*status)
                .map_or(RetryDecision::NoRetry, is_retryable_status),
            AirError::Shape(_) => RetryDecision::NoRetry,
        }
    }
}

//! Weather alert glue.
//!
//! The pipeline only derives the notification text and decides whether the
//! alert interval has elapsed; delivery and permission handling live in the
//! host shell. Settings round-trip through the preference store as JSON.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::condition::WeatherCondition;
use crate::types::{CurrentWeather, TemperatureUnit};

/// Persisted alert preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    pub enabled: bool,
    pub interval_minutes: u32,
    pub last_alert: Option<DateTime<Utc>>,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_minutes: 180,
            last_alert: None,
        }
    }
}

impl AlertSettings {
    /// Whether an alert is due at `now`. Disabled settings never fire;
    /// otherwise fires once per interval.
    pub fn should_alert(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        match self.last_alert {
            None => true,
            Some(last) => now - last >= Duration::minutes(i64::from(self.interval_minutes)),
        }
    }

    /// Record that an alert fired at `now`.
    pub fn mark_alerted(&mut self, now: DateTime<Utc>) {
        self.last_alert = Some(now);
    }
}

/// Title and body for a local notification.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertMessage {
    pub title: String,
    pub body: String,
}

/// Derive the notification text from the most recent sample.
pub fn alert_message(current: &CurrentWeather, unit: TemperatureUnit) -> AlertMessage {
    let condition = WeatherCondition::classify(current.weather_code, current.is_day);
    AlertMessage {
        title: format!("{} right now", condition.description()),
        body: format!(
            "{:.0}{} (feels like {:.0}{}), wind {:.0} km/h",
            current.temperature,
            unit.symbol(),
            current.apparent_temperature,
            unit.symbol(),
            current.wind_speed,
        ),
    }
}

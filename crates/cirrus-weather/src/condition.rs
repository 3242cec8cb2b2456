use serde::{Deserialize, Serialize};

/// Weather condition categories mapped from WMO codes, day/night aware.
///
/// Drives icon, background and map-overlay selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherCondition {
    #[default]
    ClearDay,
    ClearNight,
    PartlyCloudyDay,
    PartlyCloudyNight,
    Cloudy,
    Rain,
    Showers,
    Thunderstorm,
    Snow,
    Fog,
}

impl WeatherCondition {
    /// Convert a WMO weather code to a condition.
    /// See: https://open-meteo.com/en/docs#weathervariables
    ///
    /// Total over i32: unknown codes fall back to the default branch.
    pub fn classify(code: i32, is_day: bool) -> Self {
        match code {
            0 | 1 => {
                if is_day {
                    Self::ClearDay
                } else {
                    Self::ClearNight
                }
            }
            2 => {
                if is_day {
                    Self::PartlyCloudyDay
                } else {
                    Self::PartlyCloudyNight
                }
            }
            3 => Self::Cloudy,
            45..=48 => Self::Fog,
            80..=82 => Self::Showers,
            51..=67 => Self::Rain,
            71..=77 | 85..=86 => Self::Snow,
            95..=99 => Self::Thunderstorm,
            _ => Self::ClearDay, // Unknown codes default to clear
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::ClearDay | Self::ClearNight => "Clear",
            Self::PartlyCloudyDay | Self::PartlyCloudyNight => "Partly Cloudy",
            Self::Cloudy => "Cloudy",
            Self::Rain => "Rain",
            Self::Showers => "Showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::Snow => "Snow",
            Self::Fog => "Fog",
        }
    }

    /// Get icon name for the rendering layer
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::ClearDay => "sun",
            Self::ClearNight => "moon",
            Self::PartlyCloudyDay => "cloud_sun",
            Self::PartlyCloudyNight => "cloud_moon",
            Self::Cloudy => "cloud",
            Self::Rain => "cloud_rain",
            Self::Showers => "cloud_drizzle",
            Self::Thunderstorm => "cloud_lightning",
            Self::Snow => "cloud_snow",
            Self::Fog => "cloud_fog",
        }
    }

    /// Background gradient token consumed by the theme layer.
    pub fn gradient(&self, dark_mode: bool) -> &'static str {
        if dark_mode {
            match self {
                Self::ClearDay => "night-clear",
                Self::ClearNight => "night-clear",
                Self::PartlyCloudyDay | Self::PartlyCloudyNight => "night-scattered",
                Self::Cloudy | Self::Fog => "night-overcast",
                Self::Rain | Self::Showers => "night-rain",
                Self::Thunderstorm => "night-storm",
                Self::Snow => "night-snow",
            }
        } else {
            match self {
                Self::ClearDay => "day-clear",
                Self::ClearNight => "dusk-clear",
                Self::PartlyCloudyDay => "day-scattered",
                Self::PartlyCloudyNight => "dusk-scattered",
                Self::Cloudy | Self::Fog => "day-overcast",
                Self::Rain | Self::Showers => "day-rain",
                Self::Thunderstorm => "day-storm",
                Self::Snow => "day-snow",
            }
        }
    }
}

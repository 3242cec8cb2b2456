//! Open-Meteo air-quality client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use cirrus_weather::Coordinates;

use crate::types::{AirError, AirQualityCurrent, AirQualityData, AirQualityHourly};

const AIR_QUALITY_PATH: &str = "/v1/air-quality";

const CURRENT_FIELDS: &str = "european_aqi,us_aqi,pm10,pm2_5,carbon_monoxide,\
nitrogen_dioxide,sulphur_dioxide,ozone,ammonia,dust";
const HOURLY_FIELDS: &str = "european_aqi,pm10,pm2_5";

#[derive(Debug, Clone)]
pub struct AirQualityClient {
    client: reqwest::Client,
    base_url: String,
}

impl AirQualityClient {
    /// Create a client against the given base URL.
    ///
    /// # Errors
    /// Fails if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AirError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch current and hourly pollutant data for the given coordinates.
    ///
    /// # Errors
    /// `AirError::Api` on non-2xx responses, `AirError::Shape` when the
    /// payload is malformed or its parallel arrays disagree in length.
    pub async fn fetch_air_quality(
        &self,
        coords: &Coordinates,
    ) -> Result<AirQualityData, AirError> {
        let url = format!(
            "{}{}?latitude={}&longitude={}&current={}&hourly={}&timezone=auto&timeformat=unixtime",
            self.base_url,
            AIR_QUALITY_PATH,
            coords.latitude,
            coords.longitude,
            CURRENT_FIELDS,
            HOURLY_FIELDS,
        );

        tracing::debug!(
            "Fetching air quality for ({}, {})",
            coords.latitude,
            coords.longitude
        );
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Air-quality request failed with status {}", status);
            return Err(AirError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw: AirQualityResponse = response
            .json()
            .await
            .map_err(|e| AirError::Shape(e.to_string()))?;

        map_air_quality(raw)
    }
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    latitude: f64,
    longitude: f64,
    current: RawCurrent,
    hourly: Option<RawHourly>,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    time: i64,
    european_aqi: f64,
    us_aqi: f64,
    pm10: f64,
    pm2_5: f64,
    carbon_monoxide: f64,
    nitrogen_dioxide: f64,
    sulphur_dioxide: f64,
    ozone: f64,
    ammonia: Option<f64>,
    dust: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawHourly {
    time: Vec<i64>,
    european_aqi: Vec<f64>,
    pm10: Vec<f64>,
    pm2_5: Vec<f64>,
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, AirError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AirError::Shape(format!("timestamp {} out of range", secs)))
}

fn ensure_len(field: &str, got: usize, want: usize) -> Result<(), AirError> {
    if got != want {
        return Err(AirError::Shape(format!(
            "{}: expected {} entries, got {}",
            field, want, got
        )));
    }
    Ok(())
}

fn map_air_quality(raw: AirQualityResponse) -> Result<AirQualityData, AirError> {
    let hourly = raw.hourly.map(map_hourly).transpose()?;

    Ok(AirQualityData {
        latitude: raw.latitude,
        longitude: raw.longitude,
        current: AirQualityCurrent {
            time: timestamp(raw.current.time)?,
            european_aqi: raw.current.european_aqi,
            us_aqi: raw.current.us_aqi,
            pm10: raw.current.pm10,
            pm2_5: raw.current.pm2_5,
            carbon_monoxide: raw.current.carbon_monoxide,
            nitrogen_dioxide: raw.current.nitrogen_dioxide,
            sulphur_dioxide: raw.current.sulphur_dioxide,
            ozone: raw.current.ozone,
            ammonia: raw.current.ammonia,
            dust: raw.current.dust,
        },
        hourly,
        fetched_at: Utc::now(),
    })
}

fn map_hourly(raw: RawHourly) -> Result<AirQualityHourly, AirError> {
    let len = raw.time.len();
    ensure_len("hourly.european_aqi", raw.european_aqi.len(), len)?;
    ensure_len("hourly.pm10", raw.pm10.len(), len)?;
    ensure_len("hourly.pm2_5", raw.pm2_5.len(), len)?;

    Ok(AirQualityHourly {
        time: raw
            .time
            .iter()
            .map(|&s| timestamp(s))
            .collect::<Result<_, _>>()?,
        european_aqi: raw.european_aqi,
        pm10: raw.pm10,
        pm2_5: raw.pm2_5,
    })
}

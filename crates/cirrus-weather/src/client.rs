//! Open-Meteo forecast client.
//!
//! One round trip fetches current conditions plus hourly and 7-day daily
//! series. Units are requested server-side and baked into the returned
//! values. Timestamps are requested as unixtime so the series parses into
//! UTC instants without timezone guessing.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::types::{
    Coordinates, CurrentWeather, DailyForecast, HourlyForecast, TemperatureUnit, WeatherData,
    WeatherError,
};

const FORECAST_PATH: &str = "/v1/forecast";
const FORECAST_DAYS: u8 = 7;

const CURRENT_FIELDS: &str = "temperature_2m,apparent_temperature,relative_humidity_2m,\
surface_pressure,weather_code,wind_speed_10m,wind_direction_10m,is_day,precipitation,\
cloud_cover,uv_index";
const HOURLY_FIELDS: &str = "temperature_2m,weather_code,precipitation_probability,is_day";
const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,\
precipitation_probability_max,sunrise,sunset,uv_index_max";

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
}

impl WeatherClient {
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

    /// Fetch a complete weather snapshot for the given coordinates and unit.
    ///
    /// Wind speed is fixed to km/h; the server resolves the timezone from
    /// the coordinates. Does not retry internally; compose with
    /// `cirrus_core::retry::with_retry` at the call site.
    ///
    /// # Errors
    /// `WeatherError::Api` on non-2xx responses, `WeatherError::Shape` when
    /// the payload is missing fields or its parallel arrays disagree in
    /// length (the whole fetch is rejected, never truncated).
    pub async fn fetch_weather(
        &self,
        coords: &Coordinates,
        unit: TemperatureUnit,
    ) -> Result<WeatherData, WeatherError> {
        let url = format!(
            "{}{}?latitude={}&longitude={}&current={}&hourly={}&daily={}\
&temperature_unit={}&wind_speed_unit=kmh&timezone=auto&forecast_days={}&timeformat=unixtime",
            self.base_url,
            FORECAST_PATH,
            coords.latitude,
            coords.longitude,
            CURRENT_FIELDS,
            HOURLY_FIELDS,
            DAILY_FIELDS,
            unit.as_query_param(),
            FORECAST_DAYS,
        );

        tracing::debug!("Fetching forecast for ({}, {})", coords.latitude, coords.longitude);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Forecast request failed with status {}", status);
            return Err(WeatherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let raw: ForecastResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::Shape(e.to_string()))?;

        map_forecast(raw, unit)
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    latitude: f64,
    longitude: f64,
    timezone: String,
    current: RawCurrent,
    hourly: RawHourly,
    daily: RawDaily,
}

#[derive(Debug, Deserialize)]
struct RawCurrent {
    time: i64,
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    surface_pressure: f64,
    weather_code: i32,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    is_day: i32,
    precipitation: f64,
    cloud_cover: f64,
    uv_index: f64,
}

#[derive(Debug, Deserialize)]
struct RawHourly {
    time: Vec<i64>,
    temperature_2m: Vec<f64>,
    weather_code: Vec<i32>,
    precipitation_probability: Vec<f64>,
    is_day: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct RawDaily {
    time: Vec<i64>,
    weather_code: Vec<i32>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    precipitation_probability_max: Vec<f64>,
    sunrise: Vec<i64>,
    sunset: Vec<i64>,
    uv_index_max: Vec<f64>,
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, WeatherError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| WeatherError::Shape(format!("timestamp {} out of range", secs)))
}

fn timestamps(secs: &[i64]) -> Result<Vec<DateTime<Utc>>, WeatherError> {
    secs.iter().map(|&s| timestamp(s)).collect()
}

fn ensure_len(field: &str, got: usize, want: usize) -> Result<(), WeatherError> {
    if got != want {
        return Err(WeatherError::Shape(format!(
            "{}: expected {} entries, got {}",
            field, want, got
        )));
    }
    Ok(())
}

fn map_forecast(raw: ForecastResponse, unit: TemperatureUnit) -> Result<WeatherData, WeatherError> {
    Ok(WeatherData {
        latitude: raw.latitude,
        longitude: raw.longitude,
        timezone: raw.timezone,
        unit,
        current: map_current(raw.current)?,
        hourly: map_hourly(raw.hourly)?,
        daily: map_daily(raw.daily)?,
        fetched_at: Utc::now(),
    })
}

fn map_current(raw: RawCurrent) -> Result<CurrentWeather, WeatherError> {
    Ok(CurrentWeather {
        time: timestamp(raw.time)?,
        temperature: raw.temperature_2m,
        apparent_temperature: raw.apparent_temperature,
        weather_code: raw.weather_code,
        wind_speed: raw.wind_speed_10m,
        wind_direction: raw.wind_direction_10m,
        humidity: raw.relative_humidity_2m,
        pressure: raw.surface_pressure,
        is_day: raw.is_day != 0,
        precipitation: raw.precipitation,
        cloud_cover: raw.cloud_cover,
        uv_index: raw.uv_index,
    })
}

fn map_hourly(raw: RawHourly) -> Result<HourlyForecast, WeatherError> {
    let len = raw.time.len();
    ensure_len("hourly.temperature_2m", raw.temperature_2m.len(), len)?;
    ensure_len("hourly.weather_code", raw.weather_code.len(), len)?;
    ensure_len(
        "hourly.precipitation_probability",
        raw.precipitation_probability.len(),
        len,
    )?;
    ensure_len("hourly.is_day", raw.is_day.len(), len)?;

    Ok(HourlyForecast {
        time: timestamps(&raw.time)?,
        temperature: raw.temperature_2m,
        weather_code: raw.weather_code,
        precipitation_probability: raw.precipitation_probability,
        is_day: raw.is_day.into_iter().map(|d| d != 0).collect(),
    })
}

fn map_daily(raw: RawDaily) -> Result<DailyForecast, WeatherError> {
    let len = raw.time.len();
    ensure_len("daily.weather_code", raw.weather_code.len(), len)?;
    ensure_len("daily.temperature_2m_max", raw.temperature_2m_max.len(), len)?;
    ensure_len("daily.temperature_2m_min", raw.temperature_2m_min.len(), len)?;
    ensure_len(
        "daily.precipitation_probability_max",
        raw.precipitation_probability_max.len(),
        len,
    )?;
    ensure_len("daily.sunrise", raw.sunrise.len(), len)?;
    ensure_len("daily.sunset", raw.sunset.len(), len)?;
    ensure_len("daily.uv_index_max", raw.uv_index_max.len(), len)?;

    let dates: Vec<NaiveDate> = raw
        .time
        .iter()
        .map(|&s| timestamp(s).map(|t| t.date_naive()))
        .collect::<Result<_, _>>()?;

    Ok(DailyForecast {
        time: dates,
        weather_code: raw.weather_code,
        temperature_max: raw.temperature_2m_max,
        temperature_min: raw.temperature_2m_min,
        precipitation_probability_max: raw.precipitation_probability_max,
        sunrise: timestamps(&raw.sunrise)?,
        sunset: timestamps(&raw.sunset)?,
        uv_index_max: raw.uv_index_max,
    })
}

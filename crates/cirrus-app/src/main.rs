//! Cirrus dashboard shell.
//!
//! Wires the pipeline end to end: config and settings, location detection
//! with default-city fallback, concurrent weather/air-quality/geocoding
//! fetches (cached, coalesced, retried), and a text rendering of the
//! dashboard state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;

use cirrus_air::{AirCache, AirError, AirKey, AirQualityClient, AirQualityLevel};
use cirrus_core::retry::with_retry;
use cirrus_core::settings::keys;
use cirrus_core::{Config, JsonFileBackend, RetryConfig, SettingsStore};
use cirrus_map::{generate_overlay_points, MapLayer};
use cirrus_weather::alert::{alert_message, AlertSettings};
use cirrus_weather::hourly::{is_current_hour, next_n_hours};
use cirrus_weather::location::{FixedLocationSource, UnavailableLocationSource};
use cirrus_weather::{
    detect_location, Coordinates, GeocodingClient, LocationSource, WeatherCache, WeatherClient,
    WeatherCondition, WeatherError, WeatherKey,
};

#[tokio::main]
async fn main() -> Result<()> {
    cirrus_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let settings = SettingsStore::new(Arc::new(JsonFileBackend::new(
        config.config_dir.join("settings.json"),
    )))?;

    let timeout = Duration::from_secs(config.weather.timeout_secs);
    let weather_client = WeatherClient::new(&config.endpoints.forecast_url, timeout)?;
    let geocoding = GeocodingClient::new(&config.endpoints.geocoding_url, timeout)?;
    let air_client = AirQualityClient::new(&config.endpoints.air_quality_url, timeout)?;

    let unit = settings.temperature_unit();

    // A remembered location acts as the positioning source; this shell has
    // no host geolocation capability of its own.
    let source: Box<dyn LocationSource> = match settings
        .get_json::<Coordinates>(keys::SAVED_COORDINATES)
        .filter(|_| settings.remember_location())
    {
        Some(saved) => Box::new(FixedLocationSource::new(saved)),
        None => Box::new(UnavailableLocationSource),
    };
    let default = Coordinates::new(
        config.default_location.latitude,
        config.default_location.longitude,
    )?;
    let detected = detect_location(source.as_ref(), default).await;
    if detected.is_fallback {
        tracing::warn!(
            "Location unavailable, showing default location {}",
            config.default_location.name
        );
    }
    let coords = detected.coordinates;

    let retry = RetryConfig::default();
    let weather_cache: WeatherCache = WeatherCache::new(Duration::from_secs(
        u64::from(config.weather.stale_minutes) * 60,
    ));
    let air_cache: AirCache = AirCache::new(Duration::from_secs(
        u64::from(config.air.stale_minutes) * 60,
    ));

    let weather_fut = weather_cache.get_or_fetch(WeatherKey::new(&coords, unit), || {
        with_retry(
            &retry,
            |e: &WeatherError| e.retry_decision(),
            || weather_client.fetch_weather(&coords, unit),
        )
    });
    let air_fut = air_cache.get_or_fetch(AirKey::new(&coords), || {
        with_retry(
            &retry,
            |e: &AirError| e.retry_decision(),
            || air_client.fetch_air_quality(&coords),
        )
    });
    let name_fut = geocoding.reverse_geocode(&coords);

    let (weather, air, place) = tokio::join!(weather_fut, air_fut, name_fut);

    let weather = match weather {
        Ok(data) => data,
        Err(e) => {
            tracing::error!("Weather fetch failed: {}", e);
            eprintln!("{}", e.user_message());
            return Ok(());
        }
    };

    let now = Utc::now();
    let condition = WeatherCondition::classify(weather.current.weather_code, weather.current.is_day);

    println!("Weather for {}", place);
    println!(
        "  {}  {:.0}{} (feels like {:.0}{})",
        condition.description(),
        weather.current.temperature,
        unit.symbol(),
        weather.current.apparent_temperature,
        unit.symbol(),
    );
    println!(
        "  Wind {:.0} km/h · Humidity {:.0}% · Pressure {:.0} hPa · UV {:.1}",
        weather.current.wind_speed,
        weather.current.humidity,
        weather.current.pressure,
        weather.current.uv_index,
    );

    println!("\nNext hours:");
    for i in next_n_hours(&weather.hourly.time, now, 6) {
        let marker = if is_current_hour(weather.hourly.time[i], now) {
            "now"
        } else {
            "   "
        };
        println!(
            "  {} {}  {:>5.1}{}  {}",
            marker,
            weather.hourly.time[i].format("%H:%M"),
            weather.hourly.temperature[i],
            unit.symbol(),
            WeatherCondition::classify(weather.hourly.weather_code[i], weather.hourly.is_day[i])
                .description(),
        );
    }

    println!("\nDaily:");
    for i in 0..weather.daily.len() {
        println!(
            "  {}  {:>5.1} / {:>5.1}{}  {}",
            weather.daily.time[i],
            weather.daily.temperature_max[i],
            weather.daily.temperature_min[i],
            unit.symbol(),
            WeatherCondition::classify(weather.daily.weather_code[i], true).description(),
        );
    }

    match air {
        Ok(air) => {
            let level = AirQualityLevel::from_european_aqi(air.current.european_aqi);
            let advice = level.health_advice();
            println!(
                "\nAir quality: {} (European AQI {:.0})",
                level.label(),
                air.current.european_aqi
            );
            println!("  {}", advice.outdoor);
        }
        Err(e) => {
            tracing::error!("Air-quality fetch failed: {}", e);
            println!("\nAir quality unavailable: {}", e.user_message());
        }
    }

    // Overlay grids for the map view, seeded from the fetch time so a
    // given snapshot always renders the same field
    let seed = weather.current.time.timestamp() as u64;
    for layer in [
        MapLayer::Temperature,
        MapLayer::Precipitation,
        MapLayer::CloudCover,
        MapLayer::Wind,
    ] {
        let points = generate_overlay_points(&coords, Some(&weather.current), layer, unit, seed);
        tracing::debug!("{:?} overlay: {} points", layer, points.len());
    }

    let mut alerts: AlertSettings = settings.get_json(keys::WEATHER_ALERTS).unwrap_or_default();
    if alerts.should_alert(now) {
        let message = alert_message(&weather.current, unit);
        tracing::info!("Weather alert: {}: {}", message.title, message.body);
        alerts.mark_alerted(now);
        settings.set_json(keys::WEATHER_ALERTS, &alerts)?;
    }

    Ok(())
}

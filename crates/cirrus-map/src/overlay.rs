//! Synthetic overlay grid around one sample point.
//!
//! The dashboard only has a single measured sample per location, so the map
//! paints a disc of nearby points whose values are derived from that sample
//! with distance decay and seeded jitter. This is a visual approximation for
//! the overlay, not real weather data away from the center point.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use cirrus_weather::{Coordinates, CurrentWeather, TemperatureUnit};

/// Half-width of the candidate grid, in index steps.
pub const GRID_HALF_WIDTH: i32 = 5;
/// Spacing between grid points, in degrees.
pub const GRID_SPACING_DEG: f64 = 0.045;

const JITTER_MIN: f64 = 0.85;
const JITTER_MAX: f64 = 1.15;
/// Maximum fraction a value drifts from the sample at the disc edge.
const EDGE_DECAY: f64 = 0.25;

/// Weather field rendered by the map overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapLayer {
    Temperature,
    Precipitation,
    CloudCover,
    Wind,
}

/// One synthetic map marker.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Hex fill color
    pub color: &'static str,
    pub opacity: f64,
    /// Circle radius in meters
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tier {
    color: &'static str,
    opacity: f64,
    radius: f64,
}

impl Tier {
    const fn new(color: &'static str, opacity: f64, radius: f64) -> Self {
        Self {
            color,
            opacity,
            radius,
        }
    }
}

/// Generate overlay points for one map layer.
///
/// Enumerates a square grid of offsets around `center`, keeps only offsets
/// within the circular index radius (a disc), derives a synthetic value per
/// point and buckets it into a color/opacity/radius tier. Calm tiers (no
/// precipitation, clear sky, calm wind) render nothing. With no sample the
/// result is empty; this function has no failure mode.
///
/// The seed makes the jitter reproducible: callers pass a value derived from
/// the fetch (tests pass a constant).
pub fn generate_overlay_points(
    center: &Coordinates,
    sample: Option<&CurrentWeather>,
    layer: MapLayer,
    unit: TemperatureUnit,
    seed: u64,
) -> Vec<OverlayPoint> {
    let Some(sample) = sample else {
        return Vec::new();
    };

    let base = layer_value(sample, layer);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut points = Vec::new();

    for row in -GRID_HALF_WIDTH..=GRID_HALF_WIDTH {
        for col in -GRID_HALF_WIDTH..=GRID_HALF_WIDTH {
            if row * row + col * col > GRID_HALF_WIDTH * GRID_HALF_WIDTH {
                continue;
            }

            let dist = f64::from(row * row + col * col).sqrt() / f64::from(GRID_HALF_WIDTH);
            let decay = 1.0 - EDGE_DECAY * dist;
            let jitter = rng.gen_range(JITTER_MIN..=JITTER_MAX);
            let value = base * decay * jitter;

            let Some(tier) = bucket(value, layer, unit) else {
                continue;
            };

            points.push(OverlayPoint {
                latitude: center.latitude + f64::from(row) * GRID_SPACING_DEG,
                longitude: center.longitude + f64::from(col) * GRID_SPACING_DEG,
                color: tier.color,
                opacity: tier.opacity,
                radius: tier.radius,
            });
        }
    }

    points
}

fn layer_value(sample: &CurrentWeather, layer: MapLayer) -> f64 {
    match layer {
        MapLayer::Temperature => sample.temperature,
        MapLayer::Precipitation => sample.precipitation,
        MapLayer::CloudCover => sample.cloud_cover,
        MapLayer::Wind => sample.wind_speed,
    }
}

fn bucket(value: f64, layer: MapLayer, unit: TemperatureUnit) -> Option<Tier> {
    match layer {
        MapLayer::Temperature => {
            // Thresholds are Celsius-equivalent bands; normalize first
            let celsius = match unit {
                TemperatureUnit::Celsius => value,
                TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            };
            Some(temperature_tier(celsius))
        }
        MapLayer::Precipitation => precipitation_tier(value),
        MapLayer::CloudCover => cloud_tier(value),
        MapLayer::Wind => wind_tier(value),
    }
}

fn temperature_tier(celsius: f64) -> Tier {
    if celsius < 0.0 {
        Tier::new("#312e81", 0.40, 2600.0)
    } else if celsius < 10.0 {
        Tier::new("#3b82f6", 0.32, 2300.0)
    } else if celsius < 18.0 {
        Tier::new("#22d3ee", 0.30, 2200.0)
    } else if celsius < 26.0 {
        Tier::new("#fbbf24", 0.32, 2300.0)
    } else if celsius < 32.0 {
        Tier::new("#f97316", 0.36, 2400.0)
    } else {
        Tier::new("#dc2626", 0.40, 2600.0)
    }
}

fn precipitation_tier(mm: f64) -> Option<Tier> {
    if mm < 0.1 {
        // No precipitation: render nothing
        None
    } else if mm < 1.0 {
        Some(Tier::new("#bfdbfe", 0.25, 1800.0))
    } else if mm < 4.0 {
        Some(Tier::new("#60a5fa", 0.35, 2200.0))
    } else if mm < 10.0 {
        Some(Tier::new("#2563eb", 0.45, 2600.0))
    } else {
        Some(Tier::new("#1e3a8a", 0.55, 3000.0))
    }
}

fn cloud_tier(percent: f64) -> Option<Tier> {
    if percent < 10.0 {
        // Clear sky: render nothing
        None
    } else if percent < 35.0 {
        Some(Tier::new("#e2e8f0", 0.20, 2000.0))
    } else if percent < 65.0 {
        Some(Tier::new("#cbd5e1", 0.30, 2400.0))
    } else if percent < 85.0 {
        Some(Tier::new("#94a3b8", 0.40, 2800.0))
    } else {
        Some(Tier::new("#64748b", 0.50, 3200.0))
    }
}

fn wind_tier(kmh: f64) -> Option<Tier> {
    if kmh < 5.0 {
        // Calm: render nothing
        None
    } else if kmh < 15.0 {
        Some(Tier::new("#a7f3d0", 0.25, 2000.0))
    } else if kmh < 30.0 {
        Some(Tier::new("#34d399", 0.35, 2300.0))
    } else if kmh < 50.0 {
        Some(Tier::new("#0d9488", 0.45, 2600.0))
    } else {
        Some(Tier::new("#115e59", 0.55, 3000.0))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use chrono::{TimeZone, Utc};

    fn center() -> Coordinates {
        Coordinates::new(52.52, 13.405).unwrap()
    }

    fn sample(temperature: f64, precipitation: f64, cloud_cover: f64, wind_speed: f64) -> CurrentWeather {
        CurrentWeather {
            time: Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
            temperature,
            apparent_temperature: temperature,
            weather_code: 2,
            wind_speed,
            wind_direction: 180.0,
            humidity: 60.0,
            pressure: 1012.0,
            is_day: true,
            precipitation,
            cloud_cover,
            uv_index: 3.0,
        }
    }

    fn disc_cell_count() -> usize {
        let mut count = 0;
        for row in -GRID_HALF_WIDTH..=GRID_HALF_WIDTH {
            for col in -GRID_HALF_WIDTH..=GRID_HALF_WIDTH {
                if row * row + col * col <= GRID_HALF_WIDTH * GRID_HALF_WIDTH {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_absent_sample_degrades_to_empty() {
        let points = generate_overlay_points(
            &center(),
            None,
            MapLayer::Temperature,
            TemperatureUnit::Celsius,
            1,
        );
        assert!(points.is_empty());
    }

    #[test]
    fn test_temperature_layer_fills_the_disc() {
        let s = sample(21.0, 0.0, 50.0, 10.0);
        let points = generate_overlay_points(
            &center(),
            Some(&s),
            MapLayer::Temperature,
            TemperatureUnit::Celsius,
            7,
        );
        // Temperature has no skipped tier, so every disc cell is drawn
        assert_eq!(points.len(), disc_cell_count());
    }

    #[test]
    fn test_points_stay_within_grid_radius() {
        let s = sample(21.0, 6.0, 95.0, 40.0);
        for layer in [
            MapLayer::Temperature,
            MapLayer::Precipitation,
            MapLayer::CloudCover,
            MapLayer::Wind,
        ] {
            let points = generate_overlay_points(
                &center(),
                Some(&s),
                layer,
                TemperatureUnit::Celsius,
                42,
            );
            assert!(!points.is_empty());
            for p in &points {
                let row = ((p.latitude - center().latitude) / GRID_SPACING_DEG).round() as i32;
                let col = ((p.longitude - center().longitude) / GRID_SPACING_DEG).round() as i32;
                assert!(
                    row * row + col * col <= GRID_HALF_WIDTH * GRID_HALF_WIDTH,
                    "point outside disc: row {}, col {}",
                    row,
                    col
                );
            }
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let s = sample(3.0, 2.5, 70.0, 25.0);
        let a = generate_overlay_points(
            &center(),
            Some(&s),
            MapLayer::Precipitation,
            TemperatureUnit::Celsius,
            123,
        );
        let b = generate_overlay_points(
            &center(),
            Some(&s),
            MapLayer::Precipitation,
            TemperatureUnit::Celsius,
            123,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_precipitation_renders_nothing() {
        let s = sample(15.0, 0.0, 50.0, 10.0);
        let points = generate_overlay_points(
            &center(),
            Some(&s),
            MapLayer::Precipitation,
            TemperatureUnit::Celsius,
            9,
        );
        assert!(points.is_empty());
    }

    #[test]
    fn test_clear_sky_renders_nothing() {
        // Even with max jitter, 8% cloud cover stays under the 10% floor
        let s = sample(15.0, 0.0, 8.0, 10.0);
        let points = generate_overlay_points(
            &center(),
            Some(&s),
            MapLayer::CloudCover,
            TemperatureUnit::Celsius,
            9,
        );
        assert!(points.is_empty());
    }

    #[test]
    fn test_calm_wind_renders_nothing() {
        let s = sample(15.0, 0.0, 50.0, 3.0);
        let points = generate_overlay_points(
            &center(),
            Some(&s),
            MapLayer::Wind,
            TemperatureUnit::Celsius,
            9,
        );
        assert!(points.is_empty());
    }

    #[test]
    fn test_fahrenheit_values_bucket_in_celsius_bands() {
        // 68 °F and 20 °C are the same temperature and land in the same tier
        assert_eq!(
            bucket(68.0, MapLayer::Temperature, TemperatureUnit::Fahrenheit),
            bucket(20.0, MapLayer::Temperature, TemperatureUnit::Celsius),
        );
        // Freezing point sits on the sub-zero boundary in both units
        assert_eq!(
            bucket(31.9, MapLayer::Temperature, TemperatureUnit::Fahrenheit),
            bucket(-0.05, MapLayer::Temperature, TemperatureUnit::Celsius),
        );
    }

    #[test]
    fn test_heavier_precipitation_is_more_opaque() {
        let light = precipitation_tier(0.5).unwrap();
        let heavy = precipitation_tier(12.0).unwrap();
        assert!(heavy.opacity > light.opacity);
        assert!(heavy.radius > light.radius);
    }
}

//! Location detection.
//!
//! The host's positioning capability sits behind `LocationSource` so the
//! pipeline can run against a remembered location, a fixed test value, or a
//! host without positioning at all. Detection failure never blocks the rest
//! of the dashboard: it falls back to the configured default city.

use async_trait::async_trait;

use crate::types::{Coordinates, LocationError};

/// Single-shot positioning request (not a subscription).
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current(&self) -> Result<Coordinates, LocationError>;
}

/// Source that always reports the positioning capability as absent.
#[derive(Debug, Default)]
pub struct UnavailableLocationSource;

#[async_trait]
impl LocationSource for UnavailableLocationSource {
    async fn current(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}

/// Fixed source, e.g. a remembered location from the settings store.
#[derive(Debug)]
pub struct FixedLocationSource {
    coordinates: Coordinates,
}

impl FixedLocationSource {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationSource for FixedLocationSource {
    async fn current(&self) -> Result<Coordinates, LocationError> {
        Ok(self.coordinates)
    }
}

/// Outcome of location detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedLocation {
    pub coordinates: Coordinates,
    /// True when the source failed and the default location was used; the
    /// UI surfaces a dismissible notice in that case.
    pub is_fallback: bool,
}

/// Resolve the current location, falling back to `default` when the source
/// is unavailable, denied, or timed out.
pub async fn detect_location(
    source: &dyn LocationSource,
    default: Coordinates,
) -> DetectedLocation {
    match source.current().await {
        Ok(coordinates) => DetectedLocation {
            coordinates,
            is_fallback: false,
        },
        Err(e) => {
            tracing::warn!("Location detection failed ({}), using default location", e);
            DetectedLocation {
                coordinates: default,
                is_fallback: true,
            }
        }
    }
}

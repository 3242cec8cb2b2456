//! Map overlay generation for Cirrus
//!
//! Synthesizes a colored point grid around a single weather sample for the
//! interactive map view. The grid is a visual approximation, not spatial
//! interpolation.

pub mod overlay;

pub use overlay::{generate_overlay_points, MapLayer, OverlayPoint};

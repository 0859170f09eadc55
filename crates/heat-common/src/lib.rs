//! Common types and utilities shared across the urban heat island services.

pub mod bbox;
pub mod crs;
pub mod error;
pub mod island;
pub mod layout;

pub use bbox::BoundingBox;
pub use crs::{CrsCode, CrsParseError};
pub use error::{HeatError, HeatResult};
pub use island::{
    DetectionResult, GeoPoint, HeatIsland, HeatIslandSummary, Severity, SeverityDistribution,
    StoredDetection,
};
pub use layout::ArtifactLayout;

/// Round a value to a fixed number of decimal places.
///
/// Used for every persisted float so artifacts stay stable across runs.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

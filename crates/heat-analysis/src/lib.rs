//! Analysis algorithms for the urban heat island mapper.
//!
//! The core is [`HeatIslandDetector`]: it thresholds a temperature grid into a
//! hotspot mask, labels 4-connected regions, and reports each qualifying
//! region with its statistics, severity and geocoded centroid. The remaining
//! modules derive the input bands (LST, NDVI) and the secondary products
//! served by the API (vegetation classes, green-space recommendations).

pub mod config;
pub mod detector;
pub mod error;
pub mod labeling;
pub mod ndvi;
pub mod recommendations;
pub mod severity;
pub mod stats;
pub mod summary;
pub mod temperature;
pub mod vegetation;

pub use config::DetectionConfig;
pub use detector::HeatIslandDetector;
pub use error::{AnalysisError, Result};
pub use labeling::{label_components, LabeledGrid, LabelingError};
pub use ndvi::{compute_ndvi, ndvi_statistics};
pub use recommendations::{
    current_temperature, estimate_cooling_impact, recommend_green_spaces, validate_limit,
    CoolingImpact, GreenSpaceRecommendation, GreenSpaceReport, Priority,
    DEFAULT_RECOMMENDATION_LIMIT,
};
pub use severity::classify_severity;
pub use stats::{BandStatistics, NdviStatistics};
pub use summary::{average_intensity, filter_by_severity, summarize, tally_severity};
pub use temperature::{derive_temperature, TemperatureProduct, TemperatureSource, OUTPUT_NODATA};
pub use vegetation::{
    analyze_vegetation, PointHealth, VegetationAnalysis, VegetationHealth, VegetationLevel,
};

//! Offline batch pipeline for the urban heat island mapper.
//!
//! Reads the raw bands of one scene, derives land surface temperature and
//! NDVI, detects heat islands, analyzes vegetation, and publishes every
//! artifact into the processed-data directory read by the API.

pub mod config;
pub mod discovery;
pub mod manifest;
pub mod run;

pub use config::{parse_temperature_source, PipelineConfig};
pub use discovery::{discover_bands, SceneBands};
pub use manifest::{RunManifest, RunStatus};
pub use run::Pipeline;

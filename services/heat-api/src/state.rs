//! Application state for the heat island API.

use std::path::{Path, PathBuf};

use heat_common::{ArtifactLayout, DetectionResult, HeatError, HeatResult};
use metrics_exporter_prometheus::PrometheusHandle;
use raster_io::Raster;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Shared application state.
///
/// Artifacts are read from disk per request; the pipeline replaces them
/// atomically, so every read sees one complete version.
pub struct AppState {
    /// Processed-data directory.
    pub layout: ArtifactLayout,

    /// Prometheus recorder handle, when one is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            layout: ArtifactLayout::new(data_dir),
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Heat island result, normalized from either stored shape.
    pub fn detection(&self) -> HeatResult<DetectionResult> {
        let path = self.layout.heat_islands();
        require(&path, "Heat island data")?;
        Ok(raster_io::load_detection(&path)?)
    }

    pub fn temperature_raster(&self) -> HeatResult<Raster> {
        self.raster(&self.layout.temperature_raster(), "Temperature data")
    }

    pub fn ndvi_raster(&self) -> HeatResult<Raster> {
        self.raster(&self.layout.ndvi_raster(), "NDVI data")
    }

    /// Any JSON artifact, reported as `<what> not found` when absent.
    pub fn json<T: DeserializeOwned>(&self, path: &Path, what: &str) -> HeatResult<T> {
        require(path, what)?;
        Ok(raster_io::read_json(path)?)
    }

    fn raster(&self, path: &Path, what: &str) -> HeatResult<Raster> {
        require(path, what)?;
        debug!(path = ?path, "Reading raster artifact");
        Ok(raster_io::read_geotiff(path)?)
    }
}

fn require(path: &Path, what: &str) -> HeatResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(HeatError::not_found(what))
    }
}

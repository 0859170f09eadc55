//! File layout of the processed-data directory shared by the pipeline
//! (writer) and the query layer (reader).

use std::path::{Path, PathBuf};

pub const TEMPERATURE_RASTER: &str = "temperature.tif";
pub const TEMPERATURE_STATS: &str = "temperature_stats.json";
pub const NDVI_RASTER: &str = "ndvi.tif";
pub const NDVI_STATS: &str = "ndvi_stats.json";
pub const HEAT_ISLANDS: &str = "heat_islands.json";
pub const VEGETATION_ANALYSIS: &str = "vegetation_analysis.json";
pub const RUN_MANIFEST: &str = "pipeline_run.json";

/// Paths of every published artifact under one directory.
#[derive(Debug, Clone)]
pub struct ArtifactLayout {
    root: PathBuf,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn temperature_raster(&self) -> PathBuf {
        self.root.join(TEMPERATURE_RASTER)
    }

    pub fn temperature_stats(&self) -> PathBuf {
        self.root.join(TEMPERATURE_STATS)
    }

    pub fn ndvi_raster(&self) -> PathBuf {
        self.root.join(NDVI_RASTER)
    }

    pub fn ndvi_stats(&self) -> PathBuf {
        self.root.join(NDVI_STATS)
    }

    pub fn heat_islands(&self) -> PathBuf {
        self.root.join(HEAT_ISLANDS)
    }

    pub fn vegetation_analysis(&self) -> PathBuf {
        self.root.join(VEGETATION_ANALYSIS)
    }

    pub fn run_manifest(&self) -> PathBuf {
        self.root.join(RUN_MANIFEST)
    }

    /// Existence flag per artifact, keyed the way `/api/info` reports them.
    pub fn status(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("temperature_raster", self.temperature_raster().exists()),
            ("ndvi_raster", self.ndvi_raster().exists()),
            ("heat_islands_json", self.heat_islands().exists()),
            (
                "vegetation_analysis_json",
                self.vegetation_analysis().exists(),
            ),
        ]
    }
}

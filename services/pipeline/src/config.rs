//! Pipeline configuration.
//!
//! Values come from an optional YAML file; command-line flags (and their
//! environment fallbacks) override whatever the file sets.

use anyhow::{anyhow, Context, Result};
use heat_analysis::{DetectionConfig, TemperatureSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the raw scene bands.
    pub scene_dir: PathBuf,

    /// Directory the artifacts are published to.
    pub output_dir: PathBuf,

    /// Sensor of the temperature band.
    pub temperature_source: TemperatureSource,

    /// Heat island detector parameters.
    pub detection: DetectionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scene_dir: PathBuf::from("data/raw/scene"),
            output_dir: PathBuf::from("data/processed"),
            temperature_source: TemperatureSource::default(),
            detection: DetectionConfig::from_env(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        tracing::info!(path = ?path, "Loaded pipeline configuration");
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.detection
            .validate()
            .map_err(|e| anyhow!("invalid detection config: {}", e))?;
        if self.scene_dir.as_os_str().is_empty() {
            return Err(anyhow!("scene_dir must be set"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("output_dir must be set"));
        }
        Ok(())
    }

    /// Scene identifier used in the run manifest (the scene directory name).
    pub fn scene_name(&self) -> String {
        self.scene_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.scene_dir.display().to_string())
    }
}

/// Parse a temperature source given on the command line.
pub fn parse_temperature_source(value: &str) -> Result<TemperatureSource> {
    match value.to_lowercase().replace('-', "_").as_str() {
        "sentinel_swir" | "sentinel" | "sentinel2" => Ok(TemperatureSource::SentinelSwir),
        "landsat_l2" | "landsat" => Ok(TemperatureSource::LandsatL2),
        other => Err(anyhow!(
            "unknown temperature source '{}', expected sentinel-swir or landsat-l2",
            other
        )),
    }
}

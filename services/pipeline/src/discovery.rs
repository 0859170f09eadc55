//! Locate scene bands by file name.
//!
//! Sentinel-2 bands are matched by their band code anywhere in the name
//! (`*B11*.tif`, `*B04*.tif`, `*B08*.tif`); Landsat surface temperature by
//! the `_B10.TIF` suffix. Matching is case-insensitive and only GeoTIFFs are
//! considered.

use anyhow::{anyhow, Result};
use heat_analysis::TemperatureSource;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Band files found in a scene directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneBands {
    /// Sentinel-2 B11 (SWIR 1610 nm).
    pub swir: Option<PathBuf>,
    /// Sentinel-2 B04.
    pub red: Option<PathBuf>,
    /// Sentinel-2 B08.
    pub nir: Option<PathBuf>,
    /// Landsat C2 L2 ST_B10.
    pub thermal: Option<PathBuf>,
}

impl SceneBands {
    /// The band the temperature stage reads for `source`.
    pub fn temperature_band(&self, source: TemperatureSource) -> Result<&Path> {
        let (band, name) = match source {
            TemperatureSource::SentinelSwir => (&self.swir, "SWIR band B11"),
            TemperatureSource::LandsatL2 => (&self.thermal, "thermal band B10"),
        };
        band.as_deref()
            .ok_or_else(|| anyhow!("{} not found in scene", name))
    }

    /// Red and NIR bands, when both are present.
    pub fn ndvi_bands(&self) -> Option<(&Path, &Path)> {
        Some((self.red.as_deref()?, self.nir.as_deref()?))
    }
}

fn is_geotiff(name: &str) -> bool {
    name.ends_with(".tif") || name.ends_with(".tiff")
}

/// Walk `scene_dir` and pick the first matching file for every band.
///
/// Files are visited in sorted order so the choice is stable.
pub fn discover_bands(scene_dir: &Path) -> Result<SceneBands> {
    if !scene_dir.is_dir() {
        return Err(anyhow!("Scene directory not found: {:?}", scene_dir));
    }

    let mut bands = SceneBands::default();
    for entry in WalkDir::new(scene_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if !is_geotiff(&name) {
            continue;
        }
        let slot = if name.ends_with("_b10.tif") {
            &mut bands.thermal
        } else if name.contains("b11") {
            &mut bands.swir
        } else if name.contains("b04") {
            &mut bands.red
        } else if name.contains("b08") {
            &mut bands.nir
        } else {
            continue;
        };
        if slot.is_none() {
            debug!(path = ?entry.path(), "Matched scene band");
            *slot = Some(entry.into_path());
        }
    }

    info!(
        swir = bands.swir.is_some(),
        red = bands.red.is_some(),
        nir = bands.nir.is_some(),
        thermal = bands.thermal.is_some(),
        "Discovered scene bands"
    );
    Ok(bands)
}

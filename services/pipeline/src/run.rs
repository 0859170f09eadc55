//! One pipeline run: derive every product into a staging directory, then
//! publish.
//!
//! ```text
//! scene bands ─► temperature ─► heat islands ─┐
//!             └► NDVI ───────► vegetation ────┴─► staging ─► publish ─► manifest
//! ```
//!
//! The staging directory lives inside the output directory so publishing is
//! a same-filesystem rename per file. A failed run discards the staging
//! directory; previously published artifacts stay untouched. A successful run
//! without red/NIR bands removes the vegetation artifacts of earlier runs, so
//! the published set always comes from a single run.

use anyhow::{Context, Result};
use chrono::Utc;
use heat_analysis::{
    analyze_vegetation, compute_ndvi, derive_temperature, ndvi_statistics, HeatIslandDetector,
};
use heat_common::ArtifactLayout;
use raster_io::{read_geotiff, write_geotiff_atomic, write_json_atomic};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::discovery::{discover_bands, SceneBands};
use crate::manifest::RunManifest;

/// Batch pipeline over one scene.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage and publish the results.
    ///
    /// The manifest is written to the output directory for successful and
    /// failed runs alike; the returned manifest carries the outcome.
    pub fn run(&self) -> Result<RunManifest> {
        let run_id = Uuid::new_v4();
        let scene = self.config.scene_name();
        let span = info_span!("pipeline_run", run_id = %run_id, scene = %scene);
        let _guard = span.enter();

        let started_at = Utc::now();
        let output = ArtifactLayout::new(&self.config.output_dir);
        std::fs::create_dir_all(output.root())
            .with_context(|| format!("Failed to create output directory: {:?}", output.root()))?;

        info!("Starting urban heat island pipeline");
        let manifest = match self.stage_and_publish(&output) {
            Ok(artifacts) => {
                info!(artifacts = artifacts.len(), "Pipeline completed successfully");
                RunManifest::succeeded(run_id, scene, started_at, artifacts)
            }
            Err(e) => {
                error!(error = %format!("{:#}", e), "Pipeline failed");
                RunManifest::failed(run_id, scene, started_at, &e)
            }
        };

        write_json_atomic(&output.run_manifest(), &manifest)
            .context("Failed to write run manifest")?;
        Ok(manifest)
    }

    fn stage_and_publish(&self, output: &ArtifactLayout) -> Result<Vec<String>> {
        let staging = tempfile::Builder::new()
            .prefix(".staging-")
            .tempdir_in(output.root())
            .context("Failed to create staging directory")?;
        let staged = ArtifactLayout::new(staging.path());

        let bands = discover_bands(&self.config.scene_dir)?;
        let mut artifacts = self.temperature_stage(&bands, &staged)?;
        let vegetation = self.vegetation_stage(&bands, &staged)?;
        let skipped_vegetation = vegetation.is_empty();
        artifacts.extend(vegetation);

        publish(&staging, output.root(), &artifacts)?;
        if skipped_vegetation {
            retire(&[
                output.ndvi_raster(),
                output.ndvi_stats(),
                output.vegetation_analysis(),
            ])?;
        }
        Ok(artifacts
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect())
    }

    /// Temperature raster, its statistics and the heat island result.
    fn temperature_stage(&self, bands: &SceneBands, staged: &ArtifactLayout) -> Result<Vec<PathBuf>> {
        let source = self.config.temperature_source;
        let band_path = bands.temperature_band(source)?;
        info!(?source, band = ?band_path, "Step 1: temperature");

        let band = read_geotiff(band_path)
            .with_context(|| format!("Failed to read temperature band: {:?}", band_path))?;
        let product = derive_temperature(&band, source).context("Temperature derivation failed")?;
        write_geotiff_atomic(&staged.temperature_raster(), &product.raster)?;
        write_json_atomic(&staged.temperature_stats(), &product.stats)?;

        info!("Step 2: heat island detection");
        let detector = HeatIslandDetector::new(self.config.detection);
        let result = detector.detect_raster(&product.raster);
        write_json_atomic(&staged.heat_islands(), &result)?;

        Ok(vec![
            staged.temperature_raster(),
            staged.temperature_stats(),
            staged.heat_islands(),
        ])
    }

    /// NDVI raster, its statistics and the vegetation analysis.
    ///
    /// Skipped when the scene has no red/NIR pair.
    fn vegetation_stage(&self, bands: &SceneBands, staged: &ArtifactLayout) -> Result<Vec<PathBuf>> {
        let Some((red_path, nir_path)) = bands.ndvi_bands() else {
            warn!("Red/NIR bands not found, skipping NDVI and vegetation analysis");
            return Ok(Vec::new());
        };
        info!(red = ?red_path, nir = ?nir_path, "Step 3: NDVI");

        let red = read_geotiff(red_path)
            .with_context(|| format!("Failed to read red band: {:?}", red_path))?;
        let nir = read_geotiff(nir_path)
            .with_context(|| format!("Failed to read NIR band: {:?}", nir_path))?;
        let ndvi = compute_ndvi(&red, &nir).context("NDVI calculation failed")?;
        let stats = ndvi_statistics(&ndvi).context("NDVI statistics failed")?;
        write_geotiff_atomic(&staged.ndvi_raster(), &ndvi)?;
        write_json_atomic(&staged.ndvi_stats(), &stats)?;

        info!("Step 4: vegetation analysis");
        let analysis = analyze_vegetation(&ndvi);
        write_json_atomic(&staged.vegetation_analysis(), &analysis)?;

        Ok(vec![
            staged.ndvi_raster(),
            staged.ndvi_stats(),
            staged.vegetation_analysis(),
        ])
    }
}

/// Remove artifacts an earlier run published that this run did not produce.
fn retire(files: &[PathBuf]) -> Result<()> {
    for file in files.iter().filter(|f| f.exists()) {
        std::fs::remove_file(file)
            .with_context(|| format!("Failed to remove stale artifact {:?}", file))?;
        warn!(artifact = ?file, "Removed artifact from an earlier run");
    }
    Ok(())
}

/// Move staged files into `dest`, one rename per file.
fn publish(staging: &TempDir, dest: &Path, files: &[PathBuf]) -> Result<()> {
    for file in files {
        let name = file
            .file_name()
            .with_context(|| format!("Staged artifact has no file name: {:?}", file))?;
        let target = dest.join(name);
        std::fs::rename(file, &target)
            .with_context(|| format!("Failed to publish {:?} to {:?}", file, target))?;
    }
    info!(files = files.len(), staging = ?staging.path(), dest = ?dest, "Published artifacts");
    Ok(())
}

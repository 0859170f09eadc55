//! Urban heat island pipeline.
//!
//! Processes one satellite scene into the artifacts served by `heat-api`.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use pipeline::{parse_temperature_source, Pipeline, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "heat-pipeline")]
#[command(about = "Derive temperature, NDVI and heat island artifacts from a satellite scene")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "HEAT_PIPELINE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding the raw scene bands
    #[arg(long, env = "HEAT_SCENE_DIR")]
    scene_dir: Option<PathBuf>,

    /// Directory the artifacts are published to
    #[arg(short, long, env = "HEAT_DATA_DIR")]
    output_dir: Option<PathBuf>,

    /// Temperature source: sentinel-swir or landsat-l2
    #[arg(long, env = "HEAT_TEMPERATURE_SOURCE")]
    source: Option<String>,

    /// Degrees above the scene mean for a hotspot pixel
    #[arg(long)]
    threshold: Option<f64>,

    /// Smallest reported heat island, in pixels
    #[arg(long)]
    min_size: Option<usize>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_yaml(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = args.scene_dir {
        config.scene_dir = dir;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(source) = &args.source {
        config.temperature_source = parse_temperature_source(source)?;
    }
    if let Some(threshold) = args.threshold {
        config.detection.threshold = threshold;
    }
    if let Some(min_size) = args.min_size {
        config.detection.min_size = min_size;
    }

    info!(
        scene_dir = ?config.scene_dir,
        output_dir = ?config.output_dir,
        source = ?config.temperature_source,
        "Starting heat island pipeline"
    );

    let manifest = Pipeline::new(config)?.run()?;
    if !manifest.is_success() {
        bail!(
            "pipeline run {} failed: {}",
            manifest.run_id,
            manifest.error.unwrap_or_default()
        );
    }

    info!(run_id = %manifest.run_id, artifacts = ?manifest.artifacts, "Done");
    Ok(())
}

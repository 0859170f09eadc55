//! Heat island detection.
//!
//! ```text
//! grid ──► valid pixels ──► scene mean ──► hotspot mask ──► 4-connected labels
//!                                                              │
//!        DetectionResult ◄── sort / truncate ◄── per-region stats + geocode
//! ```
//!
//! A run holds no state between calls; the grid and transform are borrowed
//! for the duration of [`HeatIslandDetector::detect`] only.

use std::cmp::Ordering;

use heat_common::{round_to, DetectionResult, GeoPoint, HeatIsland, SeverityDistribution};
use projection::TransformChain;
use raster_io::Raster;
use tracing::{debug, info, info_span, warn};

use crate::config::DetectionConfig;
use crate::labeling::label_components;
use crate::severity::classify_severity;

/// Running totals for one labeled region.
#[derive(Debug, Clone, Copy, Default)]
struct RegionAccumulator {
    size: usize,
    sum: f64,
    max: f32,
    sum_row: f64,
    sum_col: f64,
}

impl RegionAccumulator {
    fn push(&mut self, value: f32, col: usize, row: usize) {
        if self.size == 0 || value > self.max {
            self.max = value;
        }
        self.size += 1;
        self.sum += value as f64;
        self.sum_row += row as f64;
        self.sum_col += col as f64;
    }

    fn mean(&self) -> f64 {
        self.sum / self.size as f64
    }

    /// Pixel-mass centroid as continuous `(col, row)`.
    fn centroid(&self) -> (f64, f64) {
        let n = self.size as f64;
        (self.sum_col / n, self.sum_row / n)
    }
}

/// A surviving region before rounding, kept for ordering by raw intensity.
///
/// Ordering uses the unrounded intensity, so islands whose persisted
/// one-decimal intensities tie can still appear out of label order.
struct Candidate {
    intensity: f64,
    island: HeatIsland,
}

/// Detects connected hotspot regions in a temperature grid.
#[derive(Debug, Clone, Default)]
pub struct HeatIslandDetector {
    config: DetectionConfig,
}

impl HeatIslandDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect heat islands in a georeferenced raster.
    ///
    /// The raster's own NoData sentinel, when set, takes precedence over the
    /// configured one. Without a usable CRS islands are reported unlocated.
    pub fn detect_raster(&self, raster: &Raster) -> DetectionResult {
        let chain = match raster.transform_chain() {
            Ok(chain) => Some(chain),
            Err(e) => {
                warn!(error = %e, "No transform chain, heat islands will have no location");
                None
            }
        };
        let detector = match raster.nodata() {
            Some(nodata) if !nodata.is_nan() && nodata != self.config.nodata => {
                Self::new(DetectionConfig {
                    nodata,
                    ..self.config
                })
            }
            _ => self.clone(),
        };
        detector.detect(raster.data(), raster.width(), raster.height(), chain.as_ref())
    }

    /// Detect heat islands in a row-major grid.
    ///
    /// Malformed input (length mismatch) and grids with no valid pixels yield
    /// the empty result rather than an error.
    pub fn detect(
        &self,
        grid: &[f32],
        width: usize,
        height: usize,
        chain: Option<&TransformChain>,
    ) -> DetectionResult {
        let span = info_span!("detect_heat_islands", width, height, threshold = self.config.threshold);
        let _guard = span.enter();

        let threshold = self.config.threshold;
        if grid.len() != width * height {
            warn!(
                len = grid.len(),
                width, height, "Grid length does not match its shape, skipping detection"
            );
            return DetectionResult::empty(threshold);
        }

        let nodata = self.config.nodata as f32;
        let is_valid = |v: f32| !v.is_nan() && v != nodata;

        // Scene mean over valid pixels
        let (sum, valid) = grid
            .iter()
            .filter(|&&v| is_valid(v))
            .fold((0.0f64, 0usize), |(s, n), &v| (s + v as f64, n + 1));
        if valid == 0 {
            warn!("No valid temperature pixels, returning empty result");
            return DetectionResult::empty(threshold);
        }
        let mean = sum / valid as f64;
        let cutoff = mean + threshold;

        let mask: Vec<bool> = grid
            .iter()
            .map(|&v| is_valid(v) && v as f64 > cutoff)
            .collect();

        let labeled = match label_components(&mask, width, height) {
            Ok(labeled) => labeled,
            Err(e) => {
                warn!(error = %e, "Labeling failed, returning empty result");
                return DetectionResult::empty(threshold);
            }
        };
        debug!(mean, regions = labeled.count, "Labeled hotspot regions");

        let mut regions = vec![RegionAccumulator::default(); labeled.count];
        for (idx, &label) in labeled.labels.iter().enumerate() {
            if label > 0 {
                regions[(label - 1) as usize].push(grid[idx], idx % width, idx / width);
            }
        }

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut unlocated = 0usize;
        for (i, region) in regions.iter().enumerate() {
            if region.size < self.config.min_size {
                continue;
            }
            let label = i as u32 + 1;
            let avg = region.mean();
            let intensity = avg - mean;
            let location = self.geocode(chain, label, region.centroid());
            if location.is_none() {
                unlocated += 1;
            }

            candidates.push(Candidate {
                intensity,
                island: HeatIsland::new(
                    label,
                    avg,
                    region.max as f64,
                    intensity,
                    classify_severity(intensity),
                    region.size,
                    location,
                ),
            });
        }

        // Stable: equal intensities keep label order.
        candidates.sort_by(|a, b| {
            b.intensity
                .partial_cmp(&a.intensity)
                .unwrap_or(Ordering::Equal)
        });

        let islands: Vec<HeatIsland> = candidates.into_iter().map(|c| c.island).collect();
        let total_count = islands.len();
        let severity_distribution = SeverityDistribution::from_islands(&islands);
        let heat_islands: Vec<HeatIsland> =
            islands.into_iter().take(self.config.max_results).collect();

        info!(
            total_count,
            returned = heat_islands.len(),
            unlocated,
            mean_temperature = round_to(mean, 1),
            "Heat island detection complete"
        );

        DetectionResult {
            total_count,
            mean_temperature: round_to(mean, 1),
            threshold_used: threshold,
            severity_distribution,
            heat_islands,
        }
    }

    fn geocode(
        &self,
        chain: Option<&TransformChain>,
        label: u32,
        (col, row): (f64, f64),
    ) -> Option<GeoPoint> {
        let chain = chain?;
        match chain.pixel_to_geographic(col, row) {
            Ok(point) => Some(point),
            Err(e) => {
                warn!(label, col, row, error = %e, "Failed to geocode heat island centroid");
                None
            }
        }
    }
}

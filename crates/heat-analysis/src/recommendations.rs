//! Green-space siting and park cooling estimates.
//!
//! Candidate sites are pixels that are both hot (more than 2 °C above the
//! scene mean) and poorly vegetated (NDVI below 0.3). They are scored on a
//! half-resolution copy of both rasters:
//!
//! ```text
//! score = (t_norm * 0.6 + (1 - ndvi) * 0.4) * 100
//! ```
//!
//! where `t_norm` is the candidate temperature min-max scaled over all
//! candidates.

use std::cmp::Ordering;

use raster_io::{PointSample, Raster};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AnalysisError, Result};

const CANDIDATE_TEMP_MARGIN: f64 = 2.0;
const CANDIDATE_NDVI_MAX: f64 = 0.3;
const TEMP_WEIGHT: f64 = 0.6;
const VEGETATION_WEIGHT: f64 = 0.4;
const HIGH_PRIORITY_MIN: f64 = 0.8;

pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 10;
pub const MAX_RECOMMENDATION_LIMIT: usize = 50;

/// Label for the grid the recommendations were computed on.
pub const ANALYSIS_RESOLUTION: &str = "downsampled_50pct";

/// Temperature assumed when the raster has no value at the site.
pub const DEFAULT_CURRENT_TEMPERATURE: f64 = 35.0;

const BASE_COOLING: f64 = 2.5;
const REFERENCE_AREA_SQM: f64 = 10000.0;
const MAX_SIZE_FACTOR: f64 = 1.5;
const RADIUS_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

/// One recommended site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenSpaceRecommendation {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Score on a 0–100 scale.
    pub score: f64,
    pub temperature: f64,
    pub ndvi: f64,
    pub priority: Priority,
    pub reason: String,
}

/// Response body of the green-space endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreenSpaceReport {
    pub recommendations: Vec<GreenSpaceRecommendation>,
    /// Candidates before applying the limit.
    pub total_count: usize,
    pub analysis_resolution: String,
}

/// Validate a requested recommendation count.
pub fn validate_limit(limit: usize) -> Result<usize> {
    if (1..=MAX_RECOMMENDATION_LIMIT).contains(&limit) {
        Ok(limit)
    } else {
        Err(AnalysisError::invalid_parameter(
            "limit",
            format!("Limit must be between 1 and {}", MAX_RECOMMENDATION_LIMIT),
        ))
    }
}

/// Rank candidate park sites.
///
/// Both rasters must share a shape. Candidates are located at the pixel
/// center of the half-resolution grid; a site that cannot be geocoded is
/// reported with `lat`/`lon` unset.
pub fn recommend_green_spaces(
    temperature: &Raster,
    ndvi: &Raster,
    limit: usize,
) -> Result<GreenSpaceReport> {
    let limit = validate_limit(limit)?;
    if temperature.shape() != ndvi.shape() {
        return Err(AnalysisError::shape_mismatch(temperature.shape(), ndvi.shape()));
    }

    let temp = temperature.downsample_half();
    let veg = ndvi.downsample_half();
    let width = temp.width();

    let valid: Vec<(usize, f64, f64)> = temp
        .data()
        .iter()
        .zip(veg.data())
        .enumerate()
        .filter(|(_, (&t, &v))| temp.is_valid_value(t) && veg.is_valid_value(v))
        .map(|(idx, (&t, &v))| (idx, t as f64, v as f64))
        .collect();
    if valid.is_empty() {
        return Err(AnalysisError::no_valid_data(
            "no pixel has both temperature and NDVI",
        ));
    }
    let mean = valid.iter().map(|(_, t, _)| t).sum::<f64>() / valid.len() as f64;

    let candidates: Vec<(usize, f64, f64)> = valid
        .into_iter()
        .filter(|&(_, t, v)| t > mean + CANDIDATE_TEMP_MARGIN && v < CANDIDATE_NDVI_MAX)
        .collect();
    let (t_min, t_max) = candidates
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, t, _)| {
            (lo.min(t), hi.max(t))
        });
    let span = t_max - t_min;
    debug!(mean, candidates = candidates.len(), "Selected green-space candidates");

    let chain = match temp.transform_chain() {
        Ok(chain) => Some(chain),
        Err(e) => {
            warn!(error = %e, "No transform chain, recommendations will have no location");
            None
        }
    };

    let mut recommendations: Vec<GreenSpaceRecommendation> = candidates
        .iter()
        .map(|&(idx, t, v)| {
            let t_norm = if span > 0.0 { (t - t_min) / span } else { 0.0 };
            let raw = t_norm * TEMP_WEIGHT + (1.0 - v) * VEGETATION_WEIGHT;
            let (col, row) = (idx % width, idx / width);
            let location = chain.as_ref().and_then(|chain| {
                chain
                    .pixel_to_geographic(col as f64 + 0.5, row as f64 + 0.5)
                    .map_err(|e| warn!(col, row, error = %e, "Failed to geocode candidate site"))
                    .ok()
            });
            GreenSpaceRecommendation {
                lat: location.map(|p| p.lat),
                lon: location.map(|p| p.lon),
                score: raw * 100.0,
                temperature: t,
                ndvi: v,
                priority: if raw > HIGH_PRIORITY_MIN {
                    Priority::High
                } else {
                    Priority::Medium
                },
                reason: format!("High temp ({:.1}C) & Low veg ({:.2})", t, v),
            }
        })
        .collect();

    recommendations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    let total_count = recommendations.len();
    recommendations.truncate(limit);

    info!(total_count, returned = recommendations.len(), "Ranked green-space sites");
    Ok(GreenSpaceReport {
        recommendations,
        total_count,
        analysis_resolution: ANALYSIS_RESOLUTION.to_string(),
    })
}

/// Estimated effect of a new park.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoolingImpact {
    pub current_temperature: f64,
    pub estimated_temperature_reduction: f64,
    pub estimated_final_temperature: f64,
    pub affected_radius_meters: f64,
    pub confidence: String,
    pub methodology: String,
}

/// Temperature at a site, or [`DEFAULT_CURRENT_TEMPERATURE`] when the raster
/// is missing, the point is outside it or the pixel is NoData.
pub fn current_temperature(temperature: Option<&Raster>, lon: f64, lat: f64) -> f64 {
    let Some(raster) = temperature else {
        return DEFAULT_CURRENT_TEMPERATURE;
    };
    match raster.sample_geographic(lon, lat) {
        Ok(PointSample::Value(v)) => v as f64,
        Ok(_) => DEFAULT_CURRENT_TEMPERATURE,
        Err(e) => {
            debug!(error = %e, "Could not sample temperature, using default");
            DEFAULT_CURRENT_TEMPERATURE
        }
    }
}

/// Cooling from a park of `area_sqm` with `canopy_percent` tree cover.
///
/// `cooling = 2.5 * min(area / 10000, 1.5) * (0.5 + canopy / 100)` and the
/// affected radius is 1.5 times that of a circle of the same area.
pub fn estimate_cooling_impact(
    current_temperature: f64,
    area_sqm: f64,
    canopy_percent: f64,
) -> Result<CoolingImpact> {
    if !(area_sqm > 0.0) || !(0.0..=100.0).contains(&canopy_percent) {
        return Err(AnalysisError::invalid_parameter(
            "park_area_sqm",
            "Invalid area or canopy percentage",
        ));
    }

    let size_factor = (area_sqm / REFERENCE_AREA_SQM).min(MAX_SIZE_FACTOR);
    let cooling = BASE_COOLING * size_factor * (0.5 + canopy_percent / 100.0);
    let radius = (area_sqm / std::f64::consts::PI).sqrt() * RADIUS_FACTOR;

    Ok(CoolingImpact {
        current_temperature: heat_common::round_to(current_temperature, 1),
        estimated_temperature_reduction: heat_common::round_to(cooling, 2),
        estimated_final_temperature: heat_common::round_to(current_temperature - cooling, 1),
        affected_radius_meters: heat_common::round_to(radius, 1),
        confidence: "medium".to_string(),
        methodology: "EPA Urban Heat Island research".to_string(),
    })
}

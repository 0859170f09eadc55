//! Normalized Difference Vegetation Index from Sentinel-2 red (B04) and
//! near-infrared (B08) bands.

use heat_common::round_to;
use raster_io::Raster;
use tracing::{info, instrument};

use crate::error::{AnalysisError, Result};
use crate::stats::NdviStatistics;
use crate::temperature::OUTPUT_NODATA;

const REFLECTANCE_SCALE: f32 = 10000.0;

/// NDVI above which a pixel counts toward `vegetation_coverage`.
pub const VEGETATION_COVERAGE_MIN: f64 = 0.3;

/// Compute NDVI from red and NIR bands of DN values.
///
/// A zero denominator yields 0. NoData on either band yields
/// [`OUTPUT_NODATA`]. The output keeps the red band's georeference.
#[instrument(skip_all, fields(width = red.width(), height = red.height()))]
pub fn compute_ndvi(red: &Raster, nir: &Raster) -> Result<Raster> {
    if red.shape() != nir.shape() {
        return Err(AnalysisError::shape_mismatch(red.shape(), nir.shape()));
    }

    let data: Vec<f32> = red
        .data()
        .iter()
        .zip(nir.data())
        .map(|(&r, &n)| {
            if !red.is_valid_value(r) || !nir.is_valid_value(n) {
                return OUTPUT_NODATA;
            }
            let r = r / REFLECTANCE_SCALE;
            let n = n / REFLECTANCE_SCALE;
            let denom = n + r;
            if denom == 0.0 {
                0.0
            } else {
                ((n - r) / denom).clamp(-1.0, 1.0)
            }
        })
        .collect();

    let mut raster = Raster::new(red.width(), red.height(), data, *red.transform())?
        .with_nodata(OUTPUT_NODATA as f64);
    if let Some(crs) = red.crs() {
        raster = raster.with_crs(crs.clone());
    }
    Ok(raster)
}

/// Statistics over samples strictly inside (-1, 1).
pub fn ndvi_statistics(ndvi: &Raster) -> Result<NdviStatistics> {
    let values: Vec<f64> = ndvi
        .valid_values()
        .map(f64::from)
        .filter(|v| *v > -1.0 && *v < 1.0)
        .collect();
    if values.is_empty() {
        return Err(AnalysisError::no_valid_data("NDVI raster"));
    }

    let n = values.len() as f64;
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let mean = values.iter().sum::<f64>() / n;
    let vegetated = values.iter().filter(|&&v| v > VEGETATION_COVERAGE_MIN).count();
    let stats = NdviStatistics {
        min,
        max,
        mean,
        vegetation_coverage: vegetated as f64 / n * 100.0,
    };

    info!(
        mean = round_to(stats.mean, 3),
        coverage = round_to(stats.vegetation_coverage, 1),
        "Computed NDVI statistics"
    );
    Ok(stats)
}

//! Land surface temperature (LST) derivation.
//!
//! Two sources are supported:
//!
//! - **Sentinel-2 SWIR (B11)**: a relative estimate. Reflectance is min-max
//!   scaled onto 25–50 °C and smoothed with a Gaussian (σ = 2 px). Not a
//!   radiometric retrieval.
//! - **Landsat Collection 2 Level 2 ST (B10)**: the published scale factor,
//!   `K = DN × 0.00341802 + 149.0`, converted to °C.

use raster_io::Raster;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{AnalysisError, Result};
use crate::stats::BandStatistics;

/// NoData value written to derived rasters.
pub const OUTPUT_NODATA: f32 = -9999.0;

const REFLECTANCE_SCALE: f64 = 10000.0;
const SWIR_MAX_REFLECTANCE: f64 = 0.5;
const SWIR_TEMP_MIN: f64 = 25.0;
const SWIR_TEMP_RANGE: f64 = 25.0;
const SWIR_SMOOTHING_SIGMA: f64 = 2.0;

const LANDSAT_ST_MULT: f64 = 0.00341802;
const LANDSAT_ST_ADD: f64 = 149.0;
const KELVIN_OFFSET: f64 = 273.15;
const LANDSAT_VALID_MIN: f64 = -50.0;
const LANDSAT_VALID_MAX: f64 = 70.0;

/// Which sensor the temperature band comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureSource {
    #[default]
    SentinelSwir,
    LandsatL2,
}

impl TemperatureSource {
    /// Text stored in the statistics sidecar.
    pub fn note(&self) -> &'static str {
        match self {
            TemperatureSource::SentinelSwir => "Estimated from SWIR Band 11 (Sentinel-2)",
            TemperatureSource::LandsatL2 => "Landsat Collection 2 Level 2 surface temperature (Band 10)",
        }
    }
}

/// A temperature raster and its statistics.
#[derive(Debug, Clone)]
pub struct TemperatureProduct {
    pub raster: Raster,
    pub stats: BandStatistics,
}

/// Derive LST from the given source band.
pub fn derive_temperature(band: &Raster, source: TemperatureSource) -> Result<TemperatureProduct> {
    let raster = match source {
        TemperatureSource::SentinelSwir => sentinel_swir_temperature(band)?,
        TemperatureSource::LandsatL2 => landsat_l2_temperature(band)?,
    };
    let stats = BandStatistics::compute(raster.valid_values())
        .ok_or_else(|| AnalysisError::no_valid_data("temperature raster"))?
        .with_note(source.note());
    info!(
        ?source,
        min = stats.min,
        max = stats.max,
        mean = stats.mean,
        "Derived land surface temperature"
    );
    Ok(TemperatureProduct { raster, stats })
}

/// Relative LST from a Sentinel-2 B11 band of DN values.
///
/// Pixels with DN 0 (or NoData) become [`OUTPUT_NODATA`].
#[instrument(skip(band), fields(width = band.width(), height = band.height()))]
pub fn sentinel_swir_temperature(band: &Raster) -> Result<Raster> {
    let (width, height) = band.shape();

    let reflectance: Vec<f64> = band
        .data()
        .iter()
        .map(|&dn| {
            if band.is_valid_value(dn) {
                (dn as f64 / REFLECTANCE_SCALE).clamp(0.0, SWIR_MAX_REFLECTANCE)
            } else {
                0.0
            }
        })
        .collect();

    let (lo, hi) = reflectance
        .iter()
        .filter(|&&r| r > 0.0)
        .fold(None, |acc: Option<(f64, f64)>, &r| match acc {
            None => Some((r, r)),
            Some((lo, hi)) => Some((lo.min(r), hi.max(r))),
        })
        .unwrap_or((0.0, SWIR_MAX_REFLECTANCE));
    let span = if hi - lo == 0.0 { 1.0 } else { hi - lo };

    let temperature: Vec<f64> = reflectance
        .iter()
        .map(|&r| SWIR_TEMP_MIN + (r - lo) / span * SWIR_TEMP_RANGE)
        .collect();
    let smoothed = gaussian_smooth(&temperature, width, height, SWIR_SMOOTHING_SIGMA);

    let mut valid = 0usize;
    let data: Vec<f32> = band
        .data()
        .iter()
        .zip(smoothed)
        .map(|(&dn, t)| {
            if band.is_valid_value(dn) && dn != 0.0 {
                valid += 1;
                t as f32
            } else {
                OUTPUT_NODATA
            }
        })
        .collect();

    if valid == 0 {
        return Err(AnalysisError::no_valid_data("SWIR band has no non-zero pixels"));
    }

    output_raster(band, data)
}

/// LST in °C from a Landsat C2 L2 ST band of DN values.
///
/// Pixels with DN <= 0 or outside (-50, 70) °C become [`OUTPUT_NODATA`].
#[instrument(skip(band), fields(width = band.width(), height = band.height()))]
pub fn landsat_l2_temperature(band: &Raster) -> Result<Raster> {
    let mut valid = 0usize;
    let data: Vec<f32> = band
        .data()
        .iter()
        .map(|&dn| {
            if !band.is_valid_value(dn) || dn <= 0.0 {
                return OUTPUT_NODATA;
            }
            let celsius = dn as f64 * LANDSAT_ST_MULT + LANDSAT_ST_ADD - KELVIN_OFFSET;
            if celsius > LANDSAT_VALID_MIN && celsius < LANDSAT_VALID_MAX {
                valid += 1;
                celsius as f32
            } else {
                OUTPUT_NODATA
            }
        })
        .collect();

    if valid == 0 {
        return Err(AnalysisError::no_valid_data(
            "thermal band has no pixels in the valid temperature range",
        ));
    }

    output_raster(band, data)
}

fn output_raster(template: &Raster, data: Vec<f32>) -> Result<Raster> {
    let mut raster = Raster::new(template.width(), template.height(), data, *template.transform())?
        .with_nodata(OUTPUT_NODATA as f64);
    if let Some(crs) = template.crs() {
        raster = raster.with_crs(crs.clone());
    }
    Ok(raster)
}

/// Separable Gaussian blur with mirrored borders.
///
/// The kernel is truncated at `4σ`; edges reflect about the outer pixel
/// boundary (`d c b a | a b c d | d c b a`).
pub fn gaussian_smooth(data: &[f64], width: usize, height: usize, sigma: f64) -> Vec<f64> {
    if width == 0 || height == 0 || sigma <= 0.0 {
        return data.to_vec();
    }
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;

    let mut horizontal = vec![0.0; data.len()];
    for row in 0..height {
        let line = &data[row * width..(row + 1) * width];
        for col in 0..width {
            horizontal[row * width + col] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * line[reflect(col as isize + k as isize - radius, width)])
                .sum();
        }
    }

    let mut output = vec![0.0; data.len()];
    for row in 0..height {
        for col in 0..width {
            output[row * width + col] = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| {
                    let r = reflect(row as isize + k as isize - radius, height);
                    w * horizontal[r * width + col]
                })
                .sum();
        }
    }
    output
}

fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (4.0 * sigma + 0.5) as isize;
    let weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Mirror an out-of-range index back into `0..len`.
fn reflect(index: isize, len: usize) -> usize {
    let len = len as isize;
    let period = 2 * len;
    let m = index.rem_euclid(period);
    (if m >= len { period - m - 1 } else { m }) as usize
}

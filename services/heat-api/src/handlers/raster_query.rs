//! Point sampling and heatmap extraction shared by the temperature and
//! vegetation endpoints.

use std::str::FromStr;

use axum::{extract::rejection::JsonRejection, Json};
use heat_common::{bbox::CompassBounds, HeatError, HeatResult};
use raster_io::{Interpolation, PointSample, Raster};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const MISSING_POINT_MESSAGE: &str = "Missing lat/lon in request body";

/// Body of the point endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PointRequest {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// `(lon, lat)` from a point request body; an unreadable body counts as
/// missing coordinates.
pub fn parse_point(payload: Result<Json<PointRequest>, JsonRejection>) -> Result<(f64, f64), ApiError> {
    match payload {
        Ok(Json(PointRequest {
            lat: Some(lat),
            lon: Some(lon),
        })) if lat.is_finite() && lon.is_finite() => Ok((lon, lat)),
        Ok(_) => Err(ApiError::bad_request(MISSING_POINT_MESSAGE)),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected point request body");
            Err(ApiError::bad_request(MISSING_POINT_MESSAGE))
        }
    }
}

/// Valid sample at a geographic coordinate.
pub fn sample_point(raster: &Raster, lon: f64, lat: f64) -> HeatResult<f32> {
    match raster.sample_geographic(lon, lat)? {
        PointSample::Value(v) => Ok(v),
        PointSample::NoData => Err(HeatError::NoDataAtLocation(String::new())),
        PointSample::OutOfBounds => Err(HeatError::OutOfBounds),
    }
}

/// Output grid size of a heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeatmapResolution {
    Low,
    #[default]
    Medium,
    High,
}

impl HeatmapResolution {
    pub const ALL: [HeatmapResolution; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Side of the square output grid.
    pub fn side(&self) -> usize {
        match self {
            Self::Low => 100,
            Self::Medium => 200,
            Self::High => 500,
        }
    }

    /// Parse an optional query value, defaulting to medium.
    pub fn from_query(value: Option<&str>) -> Result<Self, ApiError> {
        value.map_or(Ok(Self::default()), |v| {
            v.parse().map_err(ApiError::bad_request)
        })
    }
}

impl FromStr for HeatmapResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<String> = Self::ALL
                    .iter()
                    .map(|r| format!("'{}'", r.as_str()))
                    .collect();
                format!("Invalid resolution. Must be one of [{}]", names.join(", "))
            })
    }
}

#[derive(Debug, Deserialize)]
pub struct HeatmapQuery {
    pub resolution: Option<String>,
}

/// Body of the heatmap endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapResponse {
    /// Rows north to south; NoData as `null`.
    pub data: Vec<Vec<Option<f32>>>,
    pub bounds: CompassBounds,
    /// `[width, height]` of `data`.
    pub resolution: [usize; 2],
    pub unit: String,
}

/// Bilinear resample of `raster` onto the requested grid.
pub fn build_heatmap(
    raster: &Raster,
    resolution: HeatmapResolution,
    unit: &str,
) -> HeatResult<HeatmapResponse> {
    let side = resolution.side();
    let bounds = raster.geographic_bounds()?.to_compass();
    let grid = raster.resampled(side, side, Interpolation::Bilinear);
    Ok(HeatmapResponse {
        data: grid.to_rows(),
        bounds,
        resolution: [side, side],
        unit: unit.to_string(),
    })
}

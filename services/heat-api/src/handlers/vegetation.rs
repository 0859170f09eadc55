//! Vegetation (NDVI) endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    Json,
};
use heat_analysis::{NdviStatistics, PointHealth, VegetationAnalysis, VegetationLevel};
use heat_common::round_to;
use serde::Serialize;

use super::raster_query::{
    build_heatmap, parse_point, sample_point, HeatmapQuery, HeatmapResolution, HeatmapResponse,
    PointRequest,
};
use super::{blocking, record_request};
use crate::error::ApiError;
use crate::state::AppState;

pub const NDVI_UNIT: &str = "NDVI";

#[derive(Debug, Serialize)]
pub struct VegetationPoint {
    pub ndvi: f64,
    pub vegetation_level: VegetationLevel,
    pub health: PointHealth,
    pub lat: f64,
    pub lon: f64,
}

impl VegetationPoint {
    fn new(ndvi: f64, lon: f64, lat: f64) -> Self {
        let level = VegetationLevel::from_ndvi(ndvi);
        Self {
            ndvi: round_to(ndvi, 3),
            vegetation_level: level,
            health: level.point_health(),
            lat,
            lon,
        }
    }
}

/// POST /api/vegetation/point
pub async fn point_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<PointRequest>, JsonRejection>,
) -> Result<Json<VegetationPoint>, ApiError> {
    record_request("vegetation_point");
    let (lon, lat) = parse_point(payload)?;
    let value = blocking(move || {
        let raster = state.ndvi_raster()?;
        sample_point(&raster, lon, lat)
    })
    .await?;

    Ok(Json(VegetationPoint::new(value as f64, lon, lat)))
}

/// GET /api/vegetation/statistics
pub async fn statistics_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<NdviStatistics>, ApiError> {
    record_request("vegetation_statistics");
    let stats =
        blocking(move || state.json(&state.layout.ndvi_stats(), "NDVI statistics")).await?;
    Ok(Json(stats))
}

/// GET /api/vegetation/analysis
pub async fn analysis_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<VegetationAnalysis>, ApiError> {
    record_request("vegetation_analysis");
    let analysis = blocking(move || {
        state.json(&state.layout.vegetation_analysis(), "Vegetation analysis")
    })
    .await?;
    Ok(Json(analysis))
}

/// GET /api/vegetation/heatmap?resolution=low|medium|high
pub async fn heatmap_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<HeatmapQuery>,
) -> Result<Json<HeatmapResponse>, ApiError> {
    record_request("vegetation_heatmap");
    let resolution = HeatmapResolution::from_query(query.resolution.as_deref())?;
    let heatmap = blocking(move || {
        let raster = state.ndvi_raster()?;
        build_heatmap(&raster, resolution, NDVI_UNIT)
    })
    .await?;
    Ok(Json(heatmap))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_classification() {
        let point = VegetationPoint::new(0.61234, -118.2, 34.1);
        assert_eq!(point.ndvi, 0.612);
        assert_eq!(point.vegetation_level, VegetationLevel::ModerateVegetation);
        assert_eq!(point.health, PointHealth::Good);

        let bare = VegetationPoint::new(0.05, -118.2, 34.1);
        assert_eq!(bare.health, PointHealth::None);
    }
}

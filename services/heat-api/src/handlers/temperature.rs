//! Temperature endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    Json,
};
use heat_analysis::BandStatistics;
use heat_common::round_to;
use serde::Serialize;

use super::raster_query::{
    build_heatmap, parse_point, sample_point, HeatmapQuery, HeatmapResolution, HeatmapResponse,
    PointRequest,
};
use super::{blocking, record_request};
use crate::error::ApiError;
use crate::state::AppState;

pub const TEMPERATURE_UNIT: &str = "celsius";

#[derive(Debug, Serialize)]
pub struct TemperaturePoint {
    pub temperature: f64,
    pub lat: f64,
    pub lon: f64,
    pub unit: &'static str,
}

/// POST /api/temperature/point
pub async fn point_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<PointRequest>, JsonRejection>,
) -> Result<Json<TemperaturePoint>, ApiError> {
    record_request("temperature_point");
    let (lon, lat) = parse_point(payload)?;
    let value = blocking(move || {
        let raster = state.temperature_raster()?;
        sample_point(&raster, lon, lat)
    })
    .await?;

    Ok(Json(TemperaturePoint {
        temperature: round_to(value as f64, 2),
        lat,
        lon,
        unit: TEMPERATURE_UNIT,
    }))
}

/// GET /api/temperature/statistics
pub async fn statistics_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<BandStatistics>, ApiError> {
    record_request("temperature_statistics");
    let stats = blocking(move || {
        state.json(&state.layout.temperature_stats(), "Temperature statistics")
    })
    .await?;
    Ok(Json(stats))
}

/// GET /api/temperature/heatmap?resolution=low|medium|high
pub async fn heatmap_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<HeatmapQuery>,
) -> Result<Json<HeatmapResponse>, ApiError> {
    record_request("temperature_heatmap");
    let resolution = HeatmapResolution::from_query(query.resolution.as_deref())?;
    let heatmap = blocking(move || {
        let raster = state.temperature_raster()?;
        build_heatmap(&raster, resolution, TEMPERATURE_UNIT)
    })
    .await?;
    Ok(Json(heatmap))
}

//! Green-space recommendation handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Query},
    Json,
};
use heat_analysis::{
    current_temperature, estimate_cooling_impact, recommend_green_spaces, validate_limit,
    CoolingImpact, GreenSpaceReport, DEFAULT_RECOMMENDATION_LIMIT,
};
use heat_common::HeatError;
use serde::Deserialize;
use tracing::debug;

use super::{blocking, record_request};
use crate::error::ApiError;
use crate::state::AppState;

pub const MISSING_IMPACT_BODY_MESSAGE: &str = "Missing data";

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

/// Body of the cooling impact endpoint; absent fields read as zero.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ImpactRequest {
    pub lat: f64,
    pub lon: f64,
    pub park_area_sqm: f64,
    pub tree_canopy_percent: f64,
}

/// GET /api/recommendations/green-spaces?limit=
pub async fn green_spaces_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<GreenSpaceReport>, ApiError> {
    record_request("green_spaces");
    let limit = parse_limit(query.limit.as_deref())?;

    let report = blocking(move || {
        let layout = &state.layout;
        if !layout.temperature_raster().exists() || !layout.ndvi_raster().exists() {
            return Err(HeatError::not_found("Required raster data"));
        }
        let temperature = state.temperature_raster()?;
        let ndvi = state.ndvi_raster()?;
        Ok(recommend_green_spaces(&temperature, &ndvi, limit)?)
    })
    .await?;

    Ok(Json(report))
}

/// POST /api/recommendations/calculate-impact
pub async fn calculate_impact_handler(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<ImpactRequest>, JsonRejection>,
) -> Result<Json<CoolingImpact>, ApiError> {
    record_request("calculate_impact");
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "Rejected impact request body");
        ApiError::bad_request(MISSING_IMPACT_BODY_MESSAGE)
    })?;

    let impact = blocking(move || {
        let raster = state.temperature_raster().ok();
        let current = current_temperature(raster.as_ref(), request.lon, request.lat);
        Ok(estimate_cooling_impact(
            current,
            request.park_area_sqm,
            request.tree_canopy_percent,
        )?)
    })
    .await?;

    Ok(Json(impact))
}

/// Requested recommendation count; anything but an integer in range is a
/// bad request.
fn parse_limit(value: Option<&str>) -> Result<usize, ApiError> {
    let Some(raw) = value else {
        return Ok(DEFAULT_RECOMMENDATION_LIMIT);
    };
    let limit = raw.trim().parse::<usize>().unwrap_or(0);
    Ok(validate_limit(limit)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None).unwrap(), DEFAULT_RECOMMENDATION_LIMIT);
        assert_eq!(parse_limit(Some("25")).unwrap(), 25);
        for bad in ["0", "51", "-3", "ten"] {
            let err = parse_limit(Some(bad)).unwrap_err();
            assert_eq!(err.message, "Limit must be between 1 and 50", "limit={bad}");
        }
    }

    #[test]
    fn test_impact_request_defaults() {
        let request: ImpactRequest =
            serde_json::from_str(r#"{"park_area_sqm": 5000}"#).unwrap();
        assert_eq!(request.park_area_sqm, 5000.0);
        assert_eq!(request.tree_canopy_percent, 0.0);
        assert_eq!(request.lat, 0.0);
    }
}

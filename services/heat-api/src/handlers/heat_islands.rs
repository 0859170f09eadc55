//! Heat island endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use heat_analysis::{filter_by_severity, summarize};
use heat_common::{DetectionResult, HeatIsland, HeatIslandSummary, Severity};
use serde::Deserialize;

use super::{blocking, record_request};
use crate::error::ApiError;
use crate::state::AppState;

pub const MISSING_SEVERITY_MESSAGE: &str = "Missing severity parameter";

#[derive(Debug, Deserialize)]
pub struct SeverityQuery {
    pub severity: Option<String>,
}

/// GET /api/heat-islands/all
pub async fn all_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<DetectionResult>, ApiError> {
    record_request("heat_islands_all");
    let result = blocking(move || state.detection()).await?;
    Ok(Json(result))
}

/// GET /api/heat-islands/summary
pub async fn summary_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<HeatIslandSummary>, ApiError> {
    record_request("heat_islands_summary");
    let result = blocking(move || state.detection()).await?;
    Ok(Json(summarize(&result)))
}

/// GET /api/heat-islands/by-severity?severity=
pub async fn by_severity_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<SeverityQuery>,
) -> Result<Json<Vec<HeatIsland>>, ApiError> {
    record_request("heat_islands_by_severity");
    let severity = parse_severity(query.severity.as_deref())?;
    let result = blocking(move || state.detection()).await?;
    Ok(Json(filter_by_severity(&result, severity)))
}

fn parse_severity(value: Option<&str>) -> Result<Severity, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Err(ApiError::bad_request(MISSING_SEVERITY_MESSAGE)),
        Some(v) => v.parse().map_err(ApiError::bad_request),
    }
}

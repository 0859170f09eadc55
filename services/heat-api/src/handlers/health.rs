//! Health, info and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::routes::ROUTES;
use crate::state::AppState;

use super::{blocking, record_request};
use crate::error::ApiError;

pub const SERVICE_NAME: &str = "Urban Heat Island Mapper API";
pub const SERVICE_DESCRIPTION: &str = "Geospatial API for analyzing urban heat islands";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub routes: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub data_status: Map<String, Value>,
    pub last_updated: String,
}

/// GET /api/health
pub async fn health_handler() -> Json<HealthResponse> {
    record_request("health");
    let mut routes: Vec<&'static str> = ROUTES.to_vec();
    routes.sort_unstable();
    routes.dedup();
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        routes,
    })
}

/// GET /api/info
///
/// `last_updated` is the finish time of the last pipeline run, or the
/// current time when no run manifest exists.
pub async fn info_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<InfoResponse>, ApiError> {
    record_request("info");
    let (data_status, finished_at) = blocking(move || {
        let status: Map<String, Value> = state
            .layout
            .status()
            .into_iter()
            .map(|(name, exists)| (name.to_string(), Value::Bool(exists)))
            .collect();
        let finished_at = state
            .json::<Value>(&state.layout.run_manifest(), "Run manifest")
            .ok()
            .and_then(|m| m.get("finished_at").and_then(Value::as_str).map(String::from));
        Ok((status, finished_at))
    })
    .await?;

    Ok(Json(InfoResponse {
        name: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        description: SERVICE_DESCRIPTION,
        data_status,
        last_updated: finished_at.unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
    }))
}

/// GET /metrics - Prometheus metrics
pub async fn metrics_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let body = state
        .prometheus
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response()
}

//! Router assembly.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::handlers;
use crate::state::AppState;

/// Paths served by the API, as reported by the health endpoint.
pub const ROUTES: &[&str] = &[
    "/api/health",
    "/api/info",
    "/api/heat-islands/all",
    "/api/heat-islands/summary",
    "/api/heat-islands/by-severity",
    "/api/temperature/point",
    "/api/temperature/statistics",
    "/api/temperature/heatmap",
    "/api/vegetation/point",
    "/api/vegetation/statistics",
    "/api/vegetation/analysis",
    "/api/vegetation/heatmap",
    "/api/recommendations/green-spaces",
    "/api/recommendations/calculate-impact",
    "/metrics",
];

pub const NOT_FOUND_MESSAGE: &str = "Resource not found";

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Health and info
        .route("/health", get(handlers::health::health_handler))
        .route("/info", get(handlers::health::info_handler))
        // Heat islands
        .route("/heat-islands/all", get(handlers::heat_islands::all_handler))
        .route(
            "/heat-islands/summary",
            get(handlers::heat_islands::summary_handler),
        )
        .route(
            "/heat-islands/by-severity",
            get(handlers::heat_islands::by_severity_handler),
        )
        // Temperature
        .route(
            "/temperature/point",
            post(handlers::temperature::point_handler),
        )
        .route(
            "/temperature/statistics",
            get(handlers::temperature::statistics_handler),
        )
        .route(
            "/temperature/heatmap",
            get(handlers::temperature::heatmap_handler),
        )
        // Vegetation
        .route("/vegetation/point", post(handlers::vegetation::point_handler))
        .route(
            "/vegetation/statistics",
            get(handlers::vegetation::statistics_handler),
        )
        .route(
            "/vegetation/analysis",
            get(handlers::vegetation::analysis_handler),
        )
        .route(
            "/vegetation/heatmap",
            get(handlers::vegetation::heatmap_handler),
        )
        // Recommendations
        .route(
            "/recommendations/green-spaces",
            get(handlers::recommendations::green_spaces_handler),
        )
        .route(
            "/recommendations/calculate-impact",
            post(handlers::recommendations::calculate_impact_handler),
        );

    Router::new()
        .nest("/api", api)
        .route("/metrics", get(handlers::health::metrics_handler))
        .fallback(not_found_handler)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

async fn not_found_handler() -> ApiError {
    ApiError::not_found(NOT_FOUND_MESSAGE)
}

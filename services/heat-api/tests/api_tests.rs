//! End-to-end tests of the HTTP routes over fixture artifact directories.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use heat_api::{build_router, AppState};
use serde_json::{json, Value};
use test_utils::{assert_approx_eq, pixel_center_lon_lat, ProcessedDir};
use tower::ServiceExt;

fn router(dir: &ProcessedDir) -> Router {
    build_router(Arc::new(AppState::new(dir.path())))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

fn error_message(body: &Value) -> &str {
    body["error"].as_str().unwrap_or_default()
}

// ============================================================================
// Health and info
// ============================================================================

#[tokio::test]
async fn test_health_lists_routes() {
    let dir = ProcessedDir::empty();
    let (status, body) = get(router(&dir), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "Urban Heat Island Mapper API");
    let routes: Vec<&str> = body["routes"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(routes.contains(&"/api/recommendations/calculate-impact"));
    assert!(routes.contains(&"/metrics"));
}

#[tokio::test]
async fn test_info_reports_data_status() {
    let empty = ProcessedDir::empty();
    let (status, body) = get(router(&empty), "/api/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Urban Heat Island Mapper API");
    assert_eq!(body["data_status"]["temperature_raster"], false);
    assert_eq!(body["data_status"]["heat_islands_json"], false);
    assert!(!body["last_updated"].as_str().unwrap().is_empty());

    let complete = ProcessedDir::complete().with_json(
        heat_common::ArtifactLayout::run_manifest,
        &json!({"finished_at": "2026-07-01T12:00:00Z"}),
    );
    let (_, body) = get(router(&complete), "/api/info").await;
    for key in [
        "temperature_raster",
        "ndvi_raster",
        "heat_islands_json",
        "vegetation_analysis_json",
    ] {
        assert_eq!(body["data_status"][key], true, "{key}");
    }
    assert_eq!(body["last_updated"], "2026-07-01T12:00:00Z");
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let dir = ProcessedDir::empty();
    let app = router(&dir);
    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_unknown_route() {
    let dir = ProcessedDir::empty();
    let (status, body) = get(router(&dir), "/api/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "Resource not found");
}

// ============================================================================
// Heat islands
// ============================================================================

#[tokio::test]
async fn test_heat_islands_missing_artifact() {
    let dir = ProcessedDir::empty();
    for uri in [
        "/api/heat-islands/all",
        "/api/heat-islands/summary",
        "/api/heat-islands/by-severity?severity=high",
    ] {
        let (status, body) = get(router(&dir), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(error_message(&body), "Heat island data not found");
    }
}

#[tokio::test]
async fn test_heat_islands_all_and_summary() {
    let dir = ProcessedDir::complete();

    let (status, body) = get(router(&dir), "/api/heat-islands/all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["heat_islands"][0]["severity"], "extreme");
    assert_eq!(body["heat_islands"][1]["lat"], Value::Null);

    let (status, body) = get(router(&dir), "/api/heat-islands/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_islands"], 2);
    assert_eq!(body["average_intensity"], 9.0);
    assert_eq!(body["mean_temperature"], 25.5);
    assert_eq!(body["severity_distribution"]["extreme"], 1);
    assert_eq!(body["severity_distribution"]["low"], 0);
}

#[tokio::test]
async fn test_heat_islands_by_severity() {
    let dir = ProcessedDir::complete();

    let (status, body) = get(router(&dir), "/api/heat-islands/by-severity?severity=high").await;
    assert_eq!(status, StatusCode::OK);
    let islands = body.as_array().unwrap();
    assert_eq!(islands.len(), 1);
    assert_eq!(islands[0]["id"], "hi_2");

    let (status, body) = get(router(&dir), "/api/heat-islands/by-severity?severity=low").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) = get(router(&dir), "/api/heat-islands/by-severity").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Missing severity parameter");

    let (status, _) = get(router(&dir), "/api/heat-islands/by-severity?severity=scorching").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_legacy_island_list_is_normalized() {
    let legacy = json!([
        {"id": "hi_1", "lat": 34.1, "lon": -118.2, "avg_temp": 31.0, "max_temp": 31.0,
         "intensity": 3.0, "severity": "medium", "size_pixels": 12},
        {"id": "hi_2", "lat": null, "lon": null, "avg_temp": 36.0, "max_temp": 37.5,
         "intensity": 8.0, "severity": "extreme", "size_pixels": 20}
    ]);
    let dir = ProcessedDir::empty().with_raw("heat_islands.json", legacy.to_string().as_bytes());

    let (status, body) = get(router(&dir), "/api/heat-islands/all").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["heat_islands"][0]["id"], "hi_2");
    assert_eq!(body["severity_distribution"]["medium"], 1);
}

#[tokio::test]
async fn test_malformed_island_artifact() {
    let dir = ProcessedDir::empty().with_raw("heat_islands.json", b"{\"total_count\": ");
    let (status, _) = get(router(&dir), "/api/heat-islands/all").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// ============================================================================
// Temperature
// ============================================================================

#[tokio::test]
async fn test_temperature_point() {
    let dir = ProcessedDir::complete();
    let (lon, lat) = pixel_center_lon_lat(3, 3);

    let (status, body) = post_json(
        router(&dir),
        "/api/temperature/point",
        json!({"lat": lat, "lon": lon}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["temperature"], 38.0);
    assert_eq!(body["unit"], "celsius");
    assert_eq!(body["lat"], lat);
}

#[tokio::test]
async fn test_temperature_point_errors() {
    let dir = ProcessedDir::complete();

    let (status, body) = post_json(router(&dir), "/api/temperature/point", json!({"lat": 34.1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Missing lat/lon in request body");

    let (status, body) = post_json(
        router(&dir),
        "/api/temperature/point",
        json!({"lat": 40.7, "lon": -74.0}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Coordinates out of bounds");

    // Bottom-right fixture pixel is NoData
    let (lon, lat) = pixel_center_lon_lat(19, 19);
    let (status, body) = post_json(
        router(&dir),
        "/api/temperature/point",
        json!({"lat": lat, "lon": lon}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "No data at this location");

    let empty = ProcessedDir::empty();
    let (status, body) = post_json(
        router(&empty),
        "/api/temperature/point",
        json!({"lat": lat, "lon": lon}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "Temperature data not found");
}

#[tokio::test]
async fn test_temperature_statistics() {
    let dir = ProcessedDir::complete();
    let (status, body) = get(router(&dir), "/api/temperature/statistics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["max"], 38.0);

    let empty = ProcessedDir::empty();
    let (status, body) = get(router(&empty), "/api/temperature/statistics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "Temperature statistics not found");
}

#[tokio::test]
async fn test_temperature_heatmap() {
    let dir = ProcessedDir::complete();
    let (status, body) = get(router(&dir), "/api/temperature/heatmap?resolution=low").await;
    assert_eq!(status, StatusCode::OK);

    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 100);
    assert_eq!(rows[0].as_array().unwrap().len(), 100);
    assert_eq!(body["resolution"], json!([100, 100]));
    assert_eq!(body["unit"], "celsius");

    let bounds = &body["bounds"];
    assert_approx_eq!(bounds["west"].as_f64().unwrap(), -118.5, 1e-6);
    assert_approx_eq!(bounds["north"].as_f64().unwrap(), 34.2, 1e-6);
    assert_approx_eq!(bounds["east"].as_f64().unwrap(), -118.3, 1e-6);
    assert_approx_eq!(bounds["south"].as_f64().unwrap(), 34.0, 1e-6);

    let (_, body) = get(router(&dir), "/api/temperature/heatmap").await;
    assert_eq!(body["resolution"], json!([200, 200]));
}

#[tokio::test]
async fn test_heatmap_rejects_unknown_resolution() {
    let dir = ProcessedDir::complete();
    let (status, body) = get(router(&dir), "/api/temperature/heatmap?resolution=ultra").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&body),
        "Invalid resolution. Must be one of ['low', 'medium', 'high']"
    );
}

#[tokio::test]
async fn test_unreadable_raster_is_internal_error() {
    let dir = ProcessedDir::empty().with_raw("temperature.tif", b"not a tiff");
    let (status, body) = get(router(&dir), "/api/temperature/heatmap").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_message(&body), "Internal server error");
}

// ============================================================================
// Vegetation
// ============================================================================

#[tokio::test]
async fn test_vegetation_point() {
    let dir = ProcessedDir::complete();

    let (lon, lat) = pixel_center_lon_lat(10, 10);
    let (status, body) = post_json(
        router(&dir),
        "/api/vegetation/point",
        json!({"lat": lat, "lon": lon}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ndvi"], 0.6);
    assert_eq!(body["vegetation_level"], "moderate_vegetation");
    assert_eq!(body["health"], "good");

    let (lon, lat) = pixel_center_lon_lat(2, 2);
    let (_, body) = post_json(
        router(&dir),
        "/api/vegetation/point",
        json!({"lat": lat, "lon": lon}),
    )
    .await;
    assert_eq!(body["vegetation_level"], "bare_soil_urban");
    assert_eq!(body["health"], "none");
}

#[tokio::test]
async fn test_vegetation_artifacts() {
    let dir = ProcessedDir::complete();

    let (status, body) = get(router(&dir), "/api/vegetation/statistics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vegetation_coverage"], 90.98);

    let (status, body) = get(router(&dir), "/api/vegetation/analysis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vegetation_health"], "Good");
    assert_eq!(body["vegetation_classes"]["bare_soil_urban"]["count"], 36);

    let (status, body) = get(router(&dir), "/api/vegetation/heatmap?resolution=low").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unit"], "NDVI");

    let empty = ProcessedDir::empty();
    for (uri, message) in [
        ("/api/vegetation/statistics", "NDVI statistics not found"),
        ("/api/vegetation/analysis", "Vegetation analysis not found"),
        ("/api/vegetation/heatmap", "NDVI data not found"),
    ] {
        let (status, body) = get(router(&empty), uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(error_message(&body), message);
    }
}

// ============================================================================
// Recommendations
// ============================================================================

#[tokio::test]
async fn test_green_spaces() {
    let dir = ProcessedDir::complete();

    let (status, body) = get(router(&dir), "/api/recommendations/green-spaces").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 4);
    assert_eq!(body["analysis_resolution"], "downsampled_50pct");
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 4);
    assert_eq!(body["recommendations"][0]["priority"], "medium");

    let (_, body) = get(router(&dir), "/api/recommendations/green-spaces?limit=2").await;
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_count"], 4);
}

#[tokio::test]
async fn test_green_spaces_errors() {
    let dir = ProcessedDir::complete();
    for limit in ["0", "51", "many"] {
        let uri = format!("/api/recommendations/green-spaces?limit={limit}");
        let (status, body) = get(router(&dir), &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error_message(&body), "Limit must be between 1 and 50");
    }

    let temperature_only = ProcessedDir::empty().with_temperature(&test_utils::temperature_scene());
    let (status, body) = get(router(&temperature_only), "/api/recommendations/green-spaces").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_message(&body), "Required raster data not found");
}

#[tokio::test]
async fn test_calculate_impact() {
    let dir = ProcessedDir::complete();
    let (lon, lat) = pixel_center_lon_lat(3, 3);

    let (status, body) = post_json(
        router(&dir),
        "/api/recommendations/calculate-impact",
        json!({"lat": lat, "lon": lon, "park_area_sqm": 10000, "tree_canopy_percent": 50}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_temperature"], 38.0);
    assert_eq!(body["estimated_temperature_reduction"], 2.5);
    assert_eq!(body["estimated_final_temperature"], 35.5);
    assert_eq!(body["affected_radius_meters"], 84.6);

    // Without a temperature raster the default current temperature applies
    let empty = ProcessedDir::empty();
    let (status, body) = post_json(
        router(&empty),
        "/api/recommendations/calculate-impact",
        json!({"lat": lat, "lon": lon, "park_area_sqm": 10000, "tree_canopy_percent": 50}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_temperature"], 35.0);
}

#[tokio::test]
async fn test_calculate_impact_errors() {
    let dir = ProcessedDir::complete();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/recommendations/calculate-impact")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(&dir), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "Missing data");

    for body in [
        json!({"lat": 34.1, "lon": -118.4, "park_area_sqm": 0, "tree_canopy_percent": 20}),
        json!({"lat": 34.1, "lon": -118.4, "park_area_sqm": 5000, "tree_canopy_percent": 120}),
    ] {
        let (status, response) =
            post_json(router(&dir), "/api/recommendations/calculate-impact", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&response), "Invalid area or canopy percentage");
    }
}

//! HTTP request handlers.
//!
//! - `health`: health, info and Prometheus metrics
//! - `heat_islands`: detection result, summary and severity filter
//! - `temperature`: point sample, statistics and heatmap
//! - `vegetation`: NDVI point sample, statistics, analysis and heatmap
//! - `recommendations`: green-space siting and cooling impact
//!
//! Artifact reads and raster work run on the blocking pool.

pub mod health;
pub mod heat_islands;
pub mod raster_query;
pub mod recommendations;
pub mod temperature;
pub mod vegetation;

use heat_common::HeatResult;
use metrics::counter;

use crate::error::ApiError;

/// Run a blocking artifact read off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> HeatResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::from)
}

pub(crate) fn record_request(endpoint: &'static str) {
    counter!("heat_api_requests_total", "endpoint" => endpoint).increment(1);
}

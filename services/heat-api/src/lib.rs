//! Urban heat island HTTP API.
//!
//! Read-only query layer over the artifacts published by the pipeline:
//! heat islands, temperature and NDVI rasters with their statistics, and
//! green-space recommendations computed on demand.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::AppState;

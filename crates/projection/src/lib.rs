//! Coordinate transformations for georeferenced rasters.
//!
//! A raster position travels through two independent steps:
//!
//! ```text
//! (col, row) --AffineTransform--> (x, y) native --Reprojector--> (lon, lat)
//! ```
//!
//! [`TransformChain`] composes both for one raster.

pub mod affine;
pub mod chain;
pub mod error;
pub mod reproject;

pub use affine::AffineTransform;
pub use chain::TransformChain;
pub use error::{ProjectionError, Result};
pub use reproject::Reprojector;

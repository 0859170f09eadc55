//! Raster and artifact I/O for the heat island pipeline.
//!
//! - [`Raster`]: a single band held in memory with its affine transform, CRS
//!   and NoData sentinel
//! - [`geotiff`]: GeoTIFF decoding/encoding with GeoKey and GDAL_NODATA support
//! - [`resample`]: nearest and bilinear resampling over a fixed footprint
//! - [`artifacts`]: atomic JSON/GeoTIFF writes and artifact loading

pub mod artifacts;
pub mod error;
pub mod geotiff;
pub mod raster;
pub mod resample;

pub use artifacts::{load_detection, read_json, write_geotiff_atomic, write_json_atomic};
pub use error::{RasterError, Result};
pub use geotiff::{decode_geotiff, encode_geotiff, read_geotiff, write_geotiff};
pub use raster::{PointSample, Raster};
pub use resample::{resample_grid, Interpolation};

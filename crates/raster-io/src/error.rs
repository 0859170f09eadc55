//! Error types for raster and artifact I/O.

use std::path::PathBuf;

use heat_common::HeatError;
use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur while loading, writing or sampling rasters.
#[derive(Error, Debug)]
pub enum RasterError {
    /// The requested file does not exist.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The TIFF container could not be decoded or encoded.
    #[error("TIFF error: {0}")]
    Tiff(String),

    /// The pixel type has no f32 conversion.
    #[error("unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    /// Data length disagrees with the declared shape.
    #[error("raster data length {len} does not match {width}x{height}")]
    InvalidDimensions {
        width: usize,
        height: usize,
        len: usize,
    },

    /// Two rasters that must align have different shapes.
    #[error("raster shapes differ: {left} vs {right}")]
    ShapeMismatch { left: String, right: String },

    /// Missing or unreadable georeferencing.
    #[error("invalid georeference: {0}")]
    InvalidGeoreference(String),

    /// Coordinate transform failure.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Artifact JSON could not be parsed or produced.
    #[error("JSON error in {path}: {message}")]
    Json { path: PathBuf, message: String },
}

impl RasterError {
    /// Create a Tiff error.
    pub fn tiff(msg: impl Into<String>) -> Self {
        Self::Tiff(msg.into())
    }

    /// Create an InvalidGeoreference error.
    pub fn invalid_georeference(msg: impl Into<String>) -> Self {
        Self::InvalidGeoreference(msg.into())
    }

    /// Create a ShapeMismatch error from two `(width, height)` pairs.
    pub fn shape_mismatch(left: (usize, usize), right: (usize, usize)) -> Self {
        Self::ShapeMismatch {
            left: format!("{}x{}", left.0, left.1),
            right: format!("{}x{}", right.0, right.1),
        }
    }

    pub fn json(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Json {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

impl From<tiff::TiffError> for RasterError {
    fn from(err: tiff::TiffError) -> Self {
        Self::Tiff(err.to_string())
    }
}

impl From<RasterError> for HeatError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::NotFound(path) => HeatError::not_found(path.display().to_string()),
            RasterError::ShapeMismatch { left, right } => {
                HeatError::ShapeMismatch(format!("{} vs {}", left, right))
            }
            RasterError::Projection(e) => HeatError::ProjectionError(e.to_string()),
            RasterError::Json { .. } => HeatError::UnexpectedFormat(err.to_string()),
            other => HeatError::DataReadError(other.to_string()),
        }
    }
}

/// Result type for raster operations.
pub type Result<T> = std::result::Result<T, RasterError>;

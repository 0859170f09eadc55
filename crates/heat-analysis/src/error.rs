//! Error types for the analysis algorithms.

use heat_common::HeatError;
use raster_io::RasterError;
use thiserror::Error;

use crate::labeling::LabelingError;

/// Errors raised by the analysis stages.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// An input band has no usable pixels.
    #[error("no valid data: {0}")]
    NoValidData(String),

    /// Two bands that must align have different shapes.
    #[error("raster dimensions mismatch: {left} vs {right}")]
    ShapeMismatch { left: String, right: String },

    /// A caller-supplied parameter is out of range.
    #[error("invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Detection configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Labeling(#[from] LabelingError),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

impl AnalysisError {
    /// Create a NoValidData error.
    pub fn no_valid_data(msg: impl Into<String>) -> Self {
        Self::NoValidData(msg.into())
    }

    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a ShapeMismatch error from two `(width, height)` pairs.
    pub fn shape_mismatch(left: (usize, usize), right: (usize, usize)) -> Self {
        Self::ShapeMismatch {
            left: format!("{}x{}", left.0, left.1),
            right: format!("{}x{}", right.0, right.1),
        }
    }
}

impl From<AnalysisError> for HeatError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::InvalidParameter { param, message } => {
                HeatError::invalid_parameter(param, message)
            }
            AnalysisError::ShapeMismatch { left, right } => {
                HeatError::ShapeMismatch(format!("{} vs {}", left, right))
            }
            AnalysisError::Raster(e) => e.into(),
            other => HeatError::InternalError(other.to_string()),
        }
    }
}

/// Result type for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

//! Error types for coordinate transforms.

use thiserror::Error;

/// Errors raised while building or applying a transform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// The CRS identifier has no known projection definition.
    #[error("unsupported CRS: {0}")]
    UnsupportedCrs(String),

    /// The projection definition could not be parsed.
    #[error("invalid projection definition '{definition}': {message}")]
    InvalidDefinition { definition: String, message: String },

    /// The coordinate could not be transformed.
    #[error("transform failed for ({x}, {y}): {message}")]
    TransformFailed { x: f64, y: f64, message: String },

    /// The affine matrix has no inverse.
    #[error("affine transform is not invertible (determinant {0})")]
    SingularTransform(f64),
}

impl ProjectionError {
    pub fn transform_failed(x: f64, y: f64, message: impl Into<String>) -> Self {
        Self::TransformFailed {
            x,
            y,
            message: message.into(),
        }
    }
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;

//! Error types for the heat island services.

use thiserror::Error;

/// Result type alias using HeatError.
pub type HeatResult<T> = Result<T, HeatError>;

/// Primary error type shared by the query layer and the pipeline.
///
/// Variants fall into three groups: input absent (404), input invalid (400)
/// and unexpected faults (500).
#[derive(Debug, Error)]
pub enum HeatError {
    // === Input absent ===
    #[error("{0} not found")]
    NotFound(String),

    #[error("No data at this location{0}")]
    NoDataAtLocation(String),

    // === Input invalid ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Coordinates out of bounds")]
    OutOfBounds,

    #[error("Invalid CRS: {0}")]
    InvalidCrs(String),

    #[error("Raster dimensions mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Unexpected data format: {0}")]
    UnexpectedFormat(String),

    // === Unexpected faults ===
    #[error("Failed to read data: {0}")]
    DataReadError(String),

    #[error("Projection error: {0}")]
    ProjectionError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl HeatError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create a NotFound error for a named artifact.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            HeatError::MissingParameter(_)
            | HeatError::InvalidParameter { .. }
            | HeatError::OutOfBounds
            | HeatError::InvalidCrs(_) => 400,

            HeatError::NotFound(_) | HeatError::NoDataAtLocation(_) => 404,

            _ => 500,
        }
    }

    /// Whether the error is an unexpected fault rather than a coded condition.
    pub fn is_internal(&self) -> bool {
        self.http_status_code() >= 500
    }
}

impl From<std::io::Error> for HeatError {
    fn from(err: std::io::Error) -> Self {
        HeatError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for HeatError {
    fn from(err: serde_json::Error) -> Self {
        HeatError::InternalError(format!("JSON error: {}", err))
    }
}

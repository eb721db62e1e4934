//! Error types for the pardep crate

use thiserror::Error;

/// Result type alias for pardep operations
pub type Result<T> = std::result::Result<T, PardepError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum PardepError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Render error: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for PardepError {
    fn from(err: polars::error::PolarsError) -> Self {
        PardepError::DataError(err.to_string())
    }
}

impl From<image::ImageError> for PardepError {
    fn from(err: image::ImageError) -> Self {
        PardepError::RenderError(err.to_string())
    }
}

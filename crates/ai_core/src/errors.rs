//! Error types for the model crate

use thiserror::Error;

use crate::serde_canon::CanonicalError;

/// Errors raised by forest models
#[derive(Error, Debug)]
pub enum ModelError {
    /// Model structure is inconsistent
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    /// Feature row length does not match the training feature count
    #[error("Expected {expected} features, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    /// Feature value is NaN or infinite
    #[error("Invalid feature value at index {index}: {value}")]
    InvalidFeature { index: usize, value: f64 },

    /// Canonical serialization failed
    #[error("Canonical serialization error: {0}")]
    Canonical(#[from] CanonicalError),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

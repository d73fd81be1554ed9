use std::path::PathBuf;

use rugscan_ai_core::ModelError;
use thiserror::Error;

/// Errors returned by dataset loading and forest training.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Parse(#[from] csv::Error),

    #[error("CSV input has no header row")]
    MissingHeader,

    #[error("required column {column:?} not found in header")]
    MissingColumn { column: String },

    #[error("row {row}, column {column:?}: cannot use value {value:?}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("dataset has no rows to train on")]
    EmptyDataset,

    #[error("dataset has no feature columns")]
    NoFeatures,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

//! rugscan trainer - deterministic random forest training from CSV
//!
//! Loads a headed CSV file, separates the `rug_pull` label column from the
//! feature columns, and fits a random forest classifier on every row.
//!
//! ```no_run
//! let model = rugscan_ai_trainer::train_model("data/tokens.csv")?;
//! println!("{}", model.predict(&[0.4, 120.0, 3.5])?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cart;
pub mod config;
pub mod dataset;
pub mod deterministic;
pub mod errors;
pub mod evaluation;
pub mod trainer;

use rugscan_ai_core::forest::ForestModel;
use std::path::Path;

pub use config::{ForestConfig, MaxFeatures, TrainerConfig};
pub use dataset::{Dataset, FeatureStats};
pub use deterministic::{LcgRng, SplitTieBreaker};
pub use errors::TrainerError;
pub use evaluation::{evaluate, EvaluationMetrics};
pub use trainer::ForestTrainer;

/// Label column read by [`train_model`]
pub const DEFAULT_LABEL_COLUMN: &str = "rug_pull";

/// Train a forest with default hyperparameters on every row of a CSV file.
///
/// Fails with [`TrainerError::Io`] if the file cannot be read,
/// [`TrainerError::Parse`] on malformed CSV, [`TrainerError::MissingColumn`]
/// without a `rug_pull` column, [`TrainerError::InvalidValue`] on a
/// non-numeric or non-finite feature cell, and [`TrainerError::EmptyDataset`] when the file
/// has no data rows.
pub fn train_model<P: AsRef<Path>>(data_path: P) -> Result<ForestModel, TrainerError> {
    train_model_with_config(data_path, &TrainerConfig::default())
}

/// [`train_model`] with caller-supplied label column and hyperparameters
pub fn train_model_with_config<P: AsRef<Path>>(
    data_path: P,
    config: &TrainerConfig,
) -> Result<ForestModel, TrainerError> {
    config.validate()?;
    let dataset = Dataset::from_csv_with_label(data_path, &config.label_column)?;
    ForestTrainer::new(config.forest.clone()).fit(&dataset)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

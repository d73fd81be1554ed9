//! Deterministic forest model core
//!
//! Model-side types for the rugscan trainer: feature keys and fixed-point
//! probabilities, the random forest classifier and its inference path, and
//! canonical model fingerprints.
//!
//! Modules:
//! - `feature_key`: order-preserving integer keys for `f64` feature values
//! - `fixed`: micro-precision fixed-point probabilities
//! - `forest`: classification trees and the forest ensemble
//! - `serde_canon`: canonical JSON and BLAKE3 hashing
//! - `errors`: model error types

pub mod errors;
pub mod feature_key;
pub mod fixed;
pub mod forest;
pub mod serde_canon;

pub use errors::ModelError;
pub use fixed::{Fixed, SCALE};
pub use forest::{ForestModel, Node, Tree};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

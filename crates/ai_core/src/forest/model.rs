//! Random forest classifier with deterministic inference
//!
//! Every tree votes with the class distribution of the leaf a row lands in;
//! the forest probability is the mean of those distributions. Rows are
//! encoded to [feature keys](crate::feature_key) once; everything after that
//! is integer-only.

use serde::{Deserialize, Serialize};

use super::tree::Tree;
use crate::errors::{ModelError, Result};
use crate::feature_key;
use crate::fixed::{Fixed, SCALE};
use crate::serde_canon::{hash_canonical, hash_canonical_hex, to_canonical_json};

/// Current model layout version
pub const MODEL_VERSION: i32 = 1;

/// Fitted ensemble of classification trees
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForestModel {
    /// Model layout version
    pub version: i32,

    /// Fixed-point scale of leaf probabilities
    pub scale: i64,

    /// Training feature columns, in input order
    pub feature_names: Vec<String>,

    /// Sorted distinct training labels; leaf distributions index into this
    pub classes: Vec<String>,

    /// Trees in the ensemble
    pub trees: Vec<Tree>,

    /// Number of rows the model was fitted on
    pub n_samples_seen: usize,
}

impl ForestModel {
    pub fn new(
        feature_names: Vec<String>,
        classes: Vec<String>,
        trees: Vec<Tree>,
        n_samples_seen: usize,
    ) -> Self {
        Self {
            version: MODEL_VERSION,
            scale: SCALE,
            feature_names,
            classes,
            trees,
            n_samples_seen,
        }
    }

    /// Validate model structure
    pub fn validate(&self) -> Result<()> {
        if self.version != MODEL_VERSION {
            return Err(ModelError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }

        if self.scale != SCALE {
            return Err(ModelError::ValidationFailed(format!(
                "Unsupported scale: {}",
                self.scale
            )));
        }

        if self.classes.is_empty() {
            return Err(ModelError::ValidationFailed("Model has no classes".to_string()));
        }

        if self.trees.is_empty() {
            return Err(ModelError::ValidationFailed("Model has no trees".to_string()));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features(), self.classes.len())
                .map_err(|e| ModelError::ValidationFailed(format!("Tree {i} validation failed: {e}")))?;
        }

        Ok(())
    }

    /// Number of feature columns seen during fitting
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn n_samples_seen(&self) -> usize {
        self.n_samples_seen
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Class probabilities for a row of feature keys, scaled by [`SCALE`]
    pub fn predict_proba_keys(&self, keys: &[i64]) -> Result<Vec<i64>> {
        self.check_width(keys.len())?;
        if self.classes.is_empty() || self.trees.is_empty() {
            return Err(ModelError::ValidationFailed("Model is not fitted".to_string()));
        }

        let mut totals = vec![0i128; self.classes.len()];
        for (i, tree) in self.trees.iter().enumerate() {
            let distribution = tree.leaf_distribution(keys).ok_or_else(|| {
                ModelError::ValidationFailed(format!("Tree {i} did not reach a leaf"))
            })?;
            for (total, &p) in totals.iter_mut().zip(distribution) {
                *total += i128::from(p);
            }
        }

        let n_trees = self.trees.len() as i128;
        Ok(totals.into_iter().map(|total| (total / n_trees) as i64).collect())
    }

    /// Class probabilities for a raw feature row
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        let keys = self.encode_row(features)?;
        Ok(self
            .predict_proba_keys(&keys)?
            .into_iter()
            .map(|p| Fixed(p).to_f64())
            .collect())
    }

    /// Index into [`classes`](Self::classes) of the most probable class.
    ///
    /// Ties resolve to the lowest class index.
    pub fn predict_class_index(&self, keys: &[i64]) -> Result<usize> {
        let proba = self.predict_proba_keys(keys)?;
        let mut best = 0;
        for (idx, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = idx;
            }
        }
        Ok(best)
    }

    /// Predicted label for a row of feature keys
    pub fn predict_keys(&self, keys: &[i64]) -> Result<&str> {
        let idx = self.predict_class_index(keys)?;
        Ok(self.classes[idx].as_str())
    }

    /// Predicted label for a raw feature row
    pub fn predict(&self, features: &[f64]) -> Result<&str> {
        let keys = self.encode_row(features)?;
        self.predict_keys(&keys)
    }

    /// Serialize model to canonical JSON (sorted keys, no whitespace)
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(to_canonical_json(self)?)
    }

    /// BLAKE3 hash of the canonical JSON representation
    pub fn hash(&self) -> Result<[u8; 32]> {
        Ok(hash_canonical(self)?)
    }

    /// Model fingerprint as a hex string
    pub fn hash_hex(&self) -> Result<String> {
        Ok(hash_canonical_hex(self)?)
    }

    fn check_width(&self, actual: usize) -> Result<()> {
        if actual != self.n_features() {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features(),
                actual,
            });
        }
        Ok(())
    }

    fn encode_row(&self, features: &[f64]) -> Result<Vec<i64>> {
        self.check_width(features.len())?;
        features
            .iter()
            .enumerate()
            .map(|(index, &value)| feature_key::encode(value).ok_or(ModelError::InvalidFeature { index, value }))
            .collect()
    }
}

//! Random forest trainer
//!
//! Fits a bagged ensemble of CART classification trees. Each tree gets its
//! own LCG stream derived from the forest seed, used for its bootstrap
//! sample and for feature subsampling at every split.

use std::collections::BTreeSet;

use rugscan_ai_core::forest::ForestModel;
use tracing::{debug, info};

use crate::cart::{CartBuilder, TreeConfig};
use crate::config::ForestConfig;
use crate::dataset::Dataset;
use crate::deterministic::{tree_seed, LcgRng};
use crate::errors::TrainerError;

/// Random forest trainer
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Fit a forest on every row of `dataset`
    pub fn fit(&self, dataset: &Dataset) -> Result<ForestModel, TrainerError> {
        self.config.validate()?;

        if dataset.is_empty() {
            return Err(TrainerError::EmptyDataset);
        }
        if dataset.feature_count == 0 {
            return Err(TrainerError::NoFeatures);
        }

        let n_samples = dataset.len();
        let (classes, encoded) = encode_labels(&dataset.labels);

        let seed = self.config.seed.unwrap_or_else(rand::random);
        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features: self.config.max_features.resolve(dataset.feature_count),
        };

        info!(
            "Fitting {} trees on {} samples, {} features, {} classes",
            self.config.n_trees,
            n_samples,
            dataset.feature_count,
            classes.len()
        );

        let builder = CartBuilder::new(&dataset.features, &encoded, classes.len(), tree_config);
        let mut trees = Vec::with_capacity(self.config.n_trees);

        for tree_idx in 0..self.config.n_trees {
            let mut rng = LcgRng::new(tree_seed(seed, tree_idx));

            let samples: Vec<usize> = if self.config.bootstrap {
                (0..n_samples).map(|_| rng.next_range(n_samples)).collect()
            } else {
                (0..n_samples).collect()
            };

            let tree = builder.build(samples, &mut rng);
            debug!(
                "Tree {}/{}: {} nodes, depth {}",
                tree_idx + 1,
                self.config.n_trees,
                tree.nodes.len(),
                tree.depth()
            );
            trees.push(tree);
        }

        let model = ForestModel::new(dataset.feature_names.clone(), classes, trees, n_samples);
        model.validate()?;

        info!("Forest fitted: {} trees", model.num_trees());
        Ok(model)
    }
}

/// Sorted distinct labels plus each row's index into them
fn encode_labels(labels: &[String]) -> (Vec<String>, Vec<usize>) {
    let classes: Vec<String> = labels
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // every label is in `classes`, so the partition point is its exact index
    let encoded = labels
        .iter()
        .map(|label| classes.partition_point(|class| class < label))
        .collect();

    (classes, encoded)
}

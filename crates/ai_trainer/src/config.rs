//! Trainer configuration
//!
//! Defaults match a stock random forest classifier: 100 fully grown trees,
//! bootstrap sampling, and `sqrt(n_features)` candidates per split. Every
//! field can be overridden from a TOML file:
//!
//! ```toml
//! label_column = "rug_pull"
//!
//! [forest]
//! n_trees = 200
//! max_depth = 12
//! max_features = "log2"
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::errors::TrainerError;
use crate::DEFAULT_LABEL_COLUMN;

/// Number of candidate features examined at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`
    Sqrt,
    /// `floor(log2(n_features))`
    Log2,
    /// Every feature
    All,
    /// A fixed count, capped at the feature count
    Count(usize),
}

impl MaxFeatures {
    /// Resolve against the dataset width; always at least 1 when `n_features > 0`.
    pub fn resolve(self, n_features: usize) -> usize {
        if n_features == 0 {
            return 0;
        }
        let count = match self {
            MaxFeatures::Sqrt => integer_sqrt(n_features),
            MaxFeatures::Log2 => n_features.ilog2() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Count(count) => count.min(n_features),
        };
        count.max(1)
    }
}

fn integer_sqrt(n: usize) -> usize {
    let mut root = (n as f64).sqrt() as usize;
    while root * root > n {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= n {
        root += 1;
    }
    root
}

impl fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxFeatures::Sqrt => write!(f, "sqrt"),
            MaxFeatures::Log2 => write!(f, "log2"),
            MaxFeatures::All => write!(f, "all"),
            MaxFeatures::Count(count) => write!(f, "{count}"),
        }
    }
}

impl FromStr for MaxFeatures {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqrt" => Ok(MaxFeatures::Sqrt),
            "log2" => Ok(MaxFeatures::Log2),
            "all" => Ok(MaxFeatures::All),
            other => other
                .parse::<usize>()
                .map(MaxFeatures::Count)
                .map_err(|_| format!("expected sqrt, log2, all or a count, got {s:?}")),
        }
    }
}

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Maximum tree depth; `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Minimum rows a node needs before it may split
    pub min_samples_split: usize,
    /// Minimum rows on each side of a split
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    /// Draw each tree's rows with replacement
    pub bootstrap: bool,
    /// Fixed seed for reproducible forests; `None` draws fresh entropy
    pub seed: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: None,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.n_trees == 0 {
            return Err(TrainerError::InvalidConfig("n_trees must be at least 1".into()));
        }
        if self.max_depth == Some(0) {
            return Err(TrainerError::InvalidConfig("max_depth must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(TrainerError::InvalidConfig("min_samples_split must be at least 2".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(TrainerError::InvalidConfig("min_samples_leaf must be at least 1".into()));
        }
        if self.max_features == MaxFeatures::Count(0) {
            return Err(TrainerError::InvalidConfig("max_features must be at least 1".into()));
        }
        Ok(())
    }
}

/// Full training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Column holding the class label
    pub label_column: String,
    pub forest: ForestConfig,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            forest: ForestConfig::default(),
        }
    }
}

impl TrainerConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TrainerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: TrainerConfig = toml::from_str(&content)
            .map_err(|e| TrainerError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;

        info!("Loaded trainer configuration from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrainerError> {
        if self.label_column.is_empty() {
            return Err(TrainerError::InvalidConfig("label_column must not be empty".into()));
        }
        self.forest.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.label_column, "rug_pull");
        assert_eq!(config.forest.n_trees, 100);
        assert_eq!(config.forest.max_depth, None);
        assert_eq!(config.forest.max_features, MaxFeatures::Sqrt);
        assert!(config.forest.bootstrap);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(2), 1);
        assert_eq!(MaxFeatures::Sqrt.resolve(16), 4);
        assert_eq!(MaxFeatures::Sqrt.resolve(17), 4);
        assert_eq!(MaxFeatures::Log2.resolve(1), 1);
        assert_eq!(MaxFeatures::Log2.resolve(9), 3);
        assert_eq!(MaxFeatures::All.resolve(5), 5);
        assert_eq!(MaxFeatures::Count(8).resolve(5), 5);
        assert_eq!(MaxFeatures::Sqrt.resolve(0), 0);
    }

    #[test]
    fn test_max_features_parsing() {
        assert_eq!("SQRT".parse::<MaxFeatures>(), Ok(MaxFeatures::Sqrt));
        assert_eq!("log2".parse::<MaxFeatures>(), Ok(MaxFeatures::Log2));
        assert_eq!("3".parse::<MaxFeatures>(), Ok(MaxFeatures::Count(3)));
        assert!("half".parse::<MaxFeatures>().is_err());
        assert_eq!(MaxFeatures::Count(3).to_string(), "3");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut forest = ForestConfig::default();
        forest.n_trees = 0;
        assert!(forest.validate().is_err());

        let mut forest = ForestConfig::default();
        forest.min_samples_split = 1;
        assert!(forest.validate().is_err());

        let mut forest = ForestConfig::default();
        forest.max_depth = Some(0);
        assert!(forest.validate().is_err());
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[forest]").unwrap();
        writeln!(file, "n_trees = 7").unwrap();
        writeln!(file, "seed = 42").unwrap();
        writeln!(file, "max_features = {{ count = 2 }}").unwrap();
        file.flush().unwrap();

        let config = TrainerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.label_column, "rug_pull");
        assert_eq!(config.forest.n_trees, 7);
        assert_eq!(config.forest.seed, Some(42));
        assert_eq!(config.forest.max_features, MaxFeatures::Count(2));
        assert_eq!(config.forest.min_samples_leaf, 1);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[forest]").unwrap();
        writeln!(file, "n_trees = 0").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            TrainerConfig::load_from_file(file.path()),
            Err(TrainerError::InvalidConfig(_))
        ));
        assert!(matches!(
            TrainerConfig::load_from_file("/nonexistent/trainer.toml"),
            Err(TrainerError::Io { .. })
        ));
    }
}

//! rugscan forest trainer CLI
//!
//! Fits a random forest on a CSV dataset and reports the result. Nothing is
//! written to disk.

use anyhow::{Context, Result};
use clap::Parser;
use rugscan_ai_trainer::dataset::check_holdout_fraction;
use rugscan_ai_trainer::evaluation::default_positive_class;
use rugscan_ai_trainer::{evaluate, Dataset, ForestTrainer, MaxFeatures, TrainerConfig};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "rugscan-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train a random forest rug-pull classifier from CSV", long_about = None)]
struct Args {
    /// Input CSV dataset path (header row required)
    #[arg(short, long)]
    input: PathBuf,

    /// TOML configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Label column name
    #[arg(long)]
    label_column: Option<String>,

    /// Number of trees
    #[arg(long)]
    trees: Option<usize>,

    /// Maximum tree depth (unlimited when unset)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Minimum samples per leaf
    #[arg(long)]
    min_samples_leaf: Option<usize>,

    /// Candidate features per split: sqrt, log2, all, or a count
    #[arg(long)]
    max_features: Option<MaxFeatures>,

    /// Random seed for reproducible forests
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of rows held out for evaluation, in [0, 1) (0 trains on everything)
    #[arg(long, default_value = "0", value_parser = parse_holdout)]
    holdout: f64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_holdout(text: &str) -> Result<f64, String> {
    let fraction: f64 = text.parse().map_err(|e| format!("{e}"))?;
    check_holdout_fraction(fraction).map_err(|e| e.to_string())?;
    Ok(fraction)
}

impl Args {
    fn resolve_config(&self) -> Result<TrainerConfig> {
        let mut config = match &self.config {
            Some(path) => TrainerConfig::load_from_file(path).context("Failed to load configuration")?,
            None => TrainerConfig::default(),
        };

        if let Some(label) = &self.label_column {
            config.label_column = label.clone();
        }
        if let Some(trees) = self.trees {
            config.forest.n_trees = trees;
        }
        if self.max_depth.is_some() {
            config.forest.max_depth = self.max_depth;
        }
        if let Some(min_samples_leaf) = self.min_samples_leaf {
            config.forest.min_samples_leaf = min_samples_leaf;
        }
        if let Some(max_features) = self.max_features {
            config.forest.max_features = max_features;
        }
        if self.seed.is_some() {
            config.forest.seed = self.seed;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("rugscan forest trainer v{}", env!("CARGO_PKG_VERSION"));

    let config = args.resolve_config()?;

    info!("Loading dataset from: {}", args.input.display());
    let mut dataset = Dataset::from_csv_with_label(&args.input, &config.label_column)
        .context("Failed to load dataset")?;

    info!(
        "Loaded {} samples with {} features",
        dataset.len(),
        dataset.feature_count
    );
    for stats in dataset.feature_stats() {
        info!("  {}: min={}, max={}", stats.name, stats.min, stats.max);
    }

    let holdout = if args.holdout > 0.0 {
        // shuffle before splitting so the holdout is not just the file's tail
        let shuffle_seed = config.forest.seed.unwrap_or_else(rand::random) as i64;
        dataset.shuffle(shuffle_seed);
        let (train, test) = dataset
            .split_holdout(args.holdout)
            .context("Failed to split holdout set")?;
        info!("Holding out {} rows, training on {}", test.len(), train.len());
        dataset = train;
        Some(test)
    } else {
        None
    };

    info!("Training configuration:");
    info!("  Trees: {}", config.forest.n_trees);
    match config.forest.max_depth {
        Some(depth) => info!("  Max depth: {}", depth),
        None => info!("  Max depth: unlimited"),
    }
    info!("  Min samples per leaf: {}", config.forest.min_samples_leaf);
    info!("  Max features: {}", config.forest.max_features);
    match config.forest.seed {
        Some(seed) => info!("  Seed: {}", seed),
        None => info!("  Seed: random"),
    }

    let trainer = ForestTrainer::new(config.forest.clone());
    let model = trainer.fit(&dataset).context("Training failed")?;

    let total_nodes: usize = model.trees.iter().map(|tree| tree.nodes.len()).sum();
    let max_depth = model.trees.iter().map(|tree| tree.depth()).max().unwrap_or(0);
    info!("Training complete!");
    info!("  Classes: {}", model.classes().join(", "));
    info!("  Trees: {} ({} nodes, deepest {})", model.num_trees(), total_nodes, max_depth);
    info!("  Fingerprint: {}", model.hash_hex().context("Failed to fingerprint model")?);

    if let Some(test) = holdout.filter(|test| !test.is_empty()) {
        match default_positive_class(&model) {
            Some(positive) => {
                let metrics = evaluate(&model, &test, positive).context("Evaluation failed")?;
                info!("Holdout metrics (positive class {:?}):", positive);
                info!("  Accuracy:  {:.4}", metrics.accuracy);
                info!("  Precision: {:.4}", metrics.precision);
                info!("  Recall:    {:.4}", metrics.recall);
                info!("  F1 score:  {:.4}", metrics.f1_score);
                info!("  Confusion: {:?}", metrics.confusion_matrix);
            }
            None => warn!("Model has no classes; skipping evaluation"),
        }
    }

    Ok(())
}

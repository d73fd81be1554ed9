//! End-to-end tests for training from CSV files
//!
//! Covers the public `train_model` entry point: output shape, error
//! propagation, and reproducibility under a fixed seed.

use anyhow::Result;
use rugscan_ai_trainer::{
    evaluate, train_model, train_model_with_config, Dataset, ForestConfig, ForestTrainer, MaxFeatures,
    TrainerConfig, TrainerError,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_csv(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn seeded_config(seed: u64) -> TrainerConfig {
    TrainerConfig {
        forest: ForestConfig {
            seed: Some(seed),
            ..ForestConfig::default()
        },
        ..TrainerConfig::default()
    }
}

/// Two noisy clusters: low liquidity / few holders tend to rug
fn synthetic_tokens(rows: usize) -> String {
    let mut csv = String::from("liquidity,holders,volatility,rug_pull\n");
    for i in 0..rows {
        let rug = i % 2 == 0;
        let jitter = (i * 37 % 11) as f64 / 10.0;
        let (liquidity, holders, volatility) = if rug {
            (0.5 + jitter, 20 + i % 30, 4.0 + jitter)
        } else {
            (6.0 + jitter, 300 + i % 50, 1.0 + jitter / 2.0)
        };
        csv.push_str(&format!("{liquidity},{holders},{volatility},{}\n", u8::from(rug)));
    }
    csv
}

#[test]
fn test_three_row_scenario() -> Result<()> {
    let file = write_csv("a,b,rug_pull\n1,2,0\n3,4,1\n5,6,0\n")?;
    let model = train_model_with_config(file.path(), &seeded_config(42))?;

    assert_eq!(model.n_features(), 2);
    assert_eq!(model.n_samples_seen(), 3);
    assert_eq!(model.feature_names(), ["a", "b"]);
    assert_eq!(model.classes(), ["0", "1"]);
    assert_eq!(model.num_trees(), 100);

    let low = model.predict(&[1.0, 2.0])?;
    let high = model.predict(&[5.0, 6.0])?;
    assert_eq!(low, high);
    assert_eq!(low, "0");

    Ok(())
}

#[test]
fn test_default_routine_reports_training_shape() -> Result<()> {
    let file = write_csv(&synthetic_tokens(40))?;
    let model = train_model(file.path())?;

    assert_eq!(model.n_features(), 3);
    assert_eq!(model.n_samples_seen(), 40);
    model.validate()?;

    Ok(())
}

#[test]
fn test_label_column_anywhere_in_header() -> Result<()> {
    let file = write_csv("rug_pull,a,b\n0,1,2\n1,3,4\n0,5,6\n1,7,8\n")?;
    let model = train_model_with_config(file.path(), &seeded_config(3))?;

    assert_eq!(model.feature_names(), ["a", "b"]);
    assert_eq!(model.n_samples_seen(), 4);

    Ok(())
}

#[test]
fn test_missing_label_column() -> Result<()> {
    let file = write_csv("a,b,label\n1,2,0\n3,4,1\n")?;
    let err = train_model(file.path()).unwrap_err();

    assert!(matches!(err, TrainerError::MissingColumn { ref column } if column == "rug_pull"));
    Ok(())
}

#[test]
fn test_missing_file() {
    let err = train_model("/definitely/not/here/tokens.csv").unwrap_err();
    assert!(matches!(err, TrainerError::Io { .. }));
}

#[test]
fn test_header_only_file_cannot_be_fitted() -> Result<()> {
    let file = write_csv("a,b,rug_pull\n")?;
    let err = train_model(file.path()).unwrap_err();

    assert!(matches!(err, TrainerError::EmptyDataset));
    Ok(())
}

#[test]
fn test_text_features_are_rejected() -> Result<()> {
    let file = write_csv("a,chain,rug_pull\n1,eth,0\n2,bsc,1\n")?;
    let err = train_model(file.path()).unwrap_err();

    assert!(matches!(err, TrainerError::InvalidValue { row: 1, ref column, .. } if column == "chain"));
    Ok(())
}

#[test]
fn test_malformed_csv() -> Result<()> {
    let file = write_csv("a,b,rug_pull\n1,2,0\n3,4\n")?;
    let err = train_model(file.path()).unwrap_err();

    assert!(matches!(err, TrainerError::Parse(_)));
    Ok(())
}

fn exhaustive_config(seed: u64) -> TrainerConfig {
    let mut config = seeded_config(seed);
    config.forest.bootstrap = false;
    config.forest.n_trees = 10;
    config
}

#[test]
fn test_token_supply_scale_values_train() -> Result<()> {
    let file = write_csv("supply,rug_pull\n1000000000000000,0\n2000000000000000,1\n")?;

    let model = train_model(file.path())?;
    assert_eq!(model.n_samples_seen(), 2);

    let model = train_model_with_config(file.path(), &exhaustive_config(1))?;
    assert_eq!(model.predict(&[1e15])?, "0");
    assert_eq!(model.predict(&[2e15])?, "1");
    assert_eq!(model.predict(&[1e13])?, "0");
    assert_eq!(model.predict(&[9e18])?, "1");

    Ok(())
}

#[test]
fn test_sub_micro_prices_separate() -> Result<()> {
    let file = write_csv("price,rug_pull\n0.00000001,0\n0.00000002,0\n0.00000040,1\n0.00000045,1\n")?;
    let model = train_model_with_config(file.path(), &exhaustive_config(2))?;

    assert_eq!(model.predict(&[1e-8])?, "0");
    assert_eq!(model.predict(&[4.5e-7])?, "1");
    assert_eq!(model.predict_proba(&[4.5e-7])?, vec![0.0, 1.0]);
    assert!(model.trees.iter().all(|tree| tree.nodes.len() == 3));

    Ok(())
}

#[test]
fn test_non_finite_cells_are_rejected() -> Result<()> {
    for cell in ["1e400", "NaN", "-inf"] {
        let file = write_csv(&format!("a,supply,rug_pull\n1,5,0\n2,{cell},1\n"))?;
        let err = train_model(file.path()).unwrap_err();
        assert!(
            matches!(err, TrainerError::InvalidValue { row: 2, ref column, .. } if column == "supply"),
            "{cell}: {err}"
        );
    }
    Ok(())
}

#[test]
fn test_float_spelled_labels_share_a_class() -> Result<()> {
    let file = write_csv("a,rug_pull\n1,0\n2,0.0\n3,1\n4,1.0\n")?;
    let model = train_model_with_config(file.path(), &seeded_config(4))?;

    assert_eq!(model.classes(), ["0", "1"]);
    Ok(())
}

#[test]
fn test_seeded_training_is_reproducible() -> Result<()> {
    let file = write_csv(&synthetic_tokens(60))?;
    let config = seeded_config(1234);

    let model1 = train_model_with_config(file.path(), &config)?;
    let model2 = train_model_with_config(file.path(), &config)?;

    assert_eq!(model1.hash_hex()?, model2.hash_hex()?);
    assert_eq!(model1.to_canonical_json()?, model2.to_canonical_json()?);

    let rows = [[0.7, 25.0, 4.5], [6.3, 320.0, 1.2], [3.0, 150.0, 2.5], [9.0, 10.0, 8.0]];
    for row in rows {
        assert_eq!(model1.predict(&row)?, model2.predict(&row)?);
        assert_eq!(model1.predict_proba(&row)?, model2.predict_proba(&row)?);
    }

    Ok(())
}

#[test]
fn test_different_seeds_give_different_forests() -> Result<()> {
    let file = write_csv(&synthetic_tokens(60))?;

    let model1 = train_model_with_config(file.path(), &seeded_config(1))?;
    let model2 = train_model_with_config(file.path(), &seeded_config(2))?;

    assert_ne!(model1.hash_hex()?, model2.hash_hex()?);
    Ok(())
}

#[test]
fn test_clusters_are_learned() -> Result<()> {
    let file = write_csv(&synthetic_tokens(80))?;
    let model = train_model_with_config(file.path(), &seeded_config(9))?;

    assert_eq!(model.predict(&[0.8, 25.0, 4.2])?, "1");
    assert_eq!(model.predict(&[6.5, 320.0, 1.1])?, "0");

    let proba = model.predict_proba(&[0.8, 25.0, 4.2])?;
    assert!(proba[1] > 0.9);
    assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-3);

    Ok(())
}

#[test]
fn test_holdout_evaluation() -> Result<()> {
    let file = write_csv(&synthetic_tokens(100))?;
    let mut dataset = Dataset::from_csv(file.path())?;
    dataset.shuffle(5);
    let (train, test) = dataset.split_holdout(0.2)?;

    let config = ForestConfig {
        n_trees: 25,
        max_features: MaxFeatures::All,
        seed: Some(5),
        ..ForestConfig::default()
    };
    let model = ForestTrainer::new(config).fit(&train)?;
    let metrics = evaluate(&model, &test, "1")?;

    assert_eq!(metrics.samples, 20);
    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(metrics.f1_score, 1.0);

    Ok(())
}

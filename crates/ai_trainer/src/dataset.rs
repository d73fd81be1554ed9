//! CSV dataset loading and preprocessing
//!
//! Reads a headed CSV file wholesale, separates the label column from the
//! feature columns, and stores feature cells as order-preserving
//! [feature keys](rugscan_ai_core::feature_key) of their `f64` values. Also
//! provides deterministic shuffling and holdout splitting.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use rugscan_ai_core::feature_key;
use tracing::debug;

use crate::deterministic::xxhash64_i64;
use crate::errors::TrainerError;
use crate::DEFAULT_LABEL_COLUMN;

/// Training dataset: feature-key matrix plus label vector
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    /// Feature column names, in header order with the label removed
    pub feature_names: Vec<String>,
    /// One row per sample, `feature_count` keys each
    pub features: Vec<Vec<i64>>,
    /// Class label per sample
    pub labels: Vec<String>,
    pub feature_count: usize,
}

/// Observed range of a feature column
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureStats {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl Dataset {
    /// Load a CSV file whose label column is `rug_pull`
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        Self::from_csv_with_label(path, DEFAULT_LABEL_COLUMN)
    }

    /// Load a CSV file, taking labels from `label_column`
    pub fn from_csv_with_label<P: AsRef<Path>>(
        path: P,
        label_column: &str,
    ) -> Result<Self, TrainerError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TrainerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Reading dataset from {}", path.display());
        Self::from_reader(file, label_column)
    }

    /// Parse CSV text from any reader. The first record is the header.
    pub fn from_reader<R: Read>(reader: R, label_column: &str) -> Result<Self, TrainerError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(TrainerError::MissingHeader);
        }

        let label_idx = headers
            .iter()
            .position(|name| name == label_column)
            .ok_or_else(|| TrainerError::MissingColumn {
                column: label_column.to_string(),
            })?;

        let feature_names: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != label_idx)
            .map(|(_, name)| name.to_string())
            .collect();
        let feature_count = feature_names.len();

        let mut features = Vec::new();
        let mut labels = Vec::new();

        for (row_idx, record) in reader.records().enumerate() {
            let record = record?;
            let row = row_idx + 1;

            let mut row_features = Vec::with_capacity(feature_count);
            for (col_idx, cell) in record.iter().enumerate() {
                if col_idx == label_idx {
                    continue;
                }
                let value = parse_feature(cell).ok_or_else(|| TrainerError::InvalidValue {
                    row,
                    column: headers[col_idx].to_string(),
                    value: cell.to_string(),
                })?;
                row_features.push(value);
            }

            let label = canonical_label(&record[label_idx]);
            if label.is_empty() {
                return Err(TrainerError::InvalidValue {
                    row,
                    column: label_column.to_string(),
                    value: String::new(),
                });
            }

            features.push(row_features);
            labels.push(label);
        }

        debug!("Parsed {} rows with {} features", features.len(), feature_count);

        Ok(Self {
            feature_names,
            features,
            labels,
            feature_count,
        })
    }

    /// Deterministically reorder rows using `seed`
    pub fn shuffle(&mut self, seed: i64) {
        let mut keyed: Vec<(i64, usize)> = self
            .features
            .iter()
            .enumerate()
            .map(|(i, row)| {
                // row index keeps duplicate rows from hashing to the same slot
                let hash = xxhash64_i64(row, seed.wrapping_add(i as i64));
                (hash, i)
            })
            .collect();
        keyed.sort_unstable();

        let mut features = Vec::with_capacity(keyed.len());
        let mut labels = Vec::with_capacity(keyed.len());
        for (_, idx) in keyed {
            features.push(std::mem::take(&mut self.features[idx]));
            labels.push(std::mem::take(&mut self.labels[idx]));
        }

        self.features = features;
        self.labels = labels;
    }

    /// Split off the trailing `fraction` of rows as a holdout set.
    ///
    /// Returns `(train, holdout)`. The holdout size is rounded to the
    /// nearest row; at least one row always stays in the training part.
    pub fn split_holdout(mut self, fraction: f64) -> Result<(Self, Self), TrainerError> {
        check_holdout_fraction(fraction)?;

        let n = self.len();
        let holdout = ((n as f64 * fraction).round() as usize).min(n.saturating_sub(1));
        let cut = n - holdout;

        let test = Self {
            feature_names: self.feature_names.clone(),
            features: self.features.split_off(cut),
            labels: self.labels.split_off(cut),
            feature_count: self.feature_count,
        };

        Ok((self, test))
    }

    /// Get number of samples
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if dataset is empty
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Per-column min/max; empty datasets report zero ranges
    pub fn feature_stats(&self) -> Vec<FeatureStats> {
        // keys order like their values, so extremes can be taken on keys
        let mut ranges = vec![(i64::MAX, i64::MIN); self.feature_count];

        for row in &self.features {
            for (range, &val) in ranges.iter_mut().zip(row) {
                range.0 = range.0.min(val);
                range.1 = range.1.max(val);
            }
        }

        self.feature_names
            .iter()
            .zip(ranges)
            .map(|(name, (min, max))| {
                let (min, max) = if min > max { (0, 0) } else { (min, max) };
                FeatureStats {
                    name: name.clone(),
                    min: feature_key::decode(min),
                    max: feature_key::decode(max),
                }
            })
            .collect()
    }
}

/// Reject holdout fractions outside `[0, 1)`, NaN included
pub fn check_holdout_fraction(fraction: f64) -> Result<(), TrainerError> {
    if !(0.0..1.0).contains(&fraction) {
        return Err(TrainerError::InvalidConfig(format!(
            "holdout fraction must be in [0, 1), got {fraction}"
        )));
    }
    Ok(())
}

/// Numeric cell to its feature key; `true`/`false` coerce to 1/0.
///
/// NaN, infinities, and literals that overflow `f64` have no key.
fn parse_feature(cell: &str) -> Option<i64> {
    let value = if cell.eq_ignore_ascii_case("true") {
        1.0
    } else if cell.eq_ignore_ascii_case("false") {
        0.0
    } else {
        cell.parse::<f64>().ok()?
    };
    feature_key::encode(value)
}

/// Numeric labels collapse to one spelling (`1.0`, `01` and `1` are all `1`);
/// anything else is kept verbatim
fn canonical_label(cell: &str) -> String {
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => (value + 0.0).to_string(),
        _ => cell.to_string(),
    }
}

//! Binary classification metrics for a fitted forest

use rugscan_ai_core::forest::ForestModel;

use crate::dataset::Dataset;
use crate::errors::TrainerError;

/// Holdout metrics against one positive class
///
/// `confusion_matrix` is `[[tn, fp], [fn, tp]]`. Ratios with a zero
/// denominator are reported as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationMetrics {
    pub samples: usize,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion_matrix: [[usize; 2]; 2],
}

/// Score `model` on every row of `dataset`, treating `positive_class` as positive
pub fn evaluate(
    model: &ForestModel,
    dataset: &Dataset,
    positive_class: &str,
) -> Result<EvaluationMetrics, TrainerError> {
    let mut matrix = [[0usize; 2]; 2];

    for (row, label) in dataset.features.iter().zip(&dataset.labels) {
        let predicted = model.predict_keys(row)? == positive_class;
        let actual = label == positive_class;
        matrix[usize::from(actual)][usize::from(predicted)] += 1;
    }

    let [[tn, fp], [fn_, tp]] = matrix;
    let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

    let accuracy = ratio(tp + tn, dataset.len());
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1_score = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    Ok(EvaluationMetrics {
        samples: dataset.len(),
        accuracy,
        precision,
        recall,
        f1_score,
        confusion_matrix: matrix,
    })
}

/// Label to report metrics against: `"1"` when present, else the last class
pub fn default_positive_class(model: &ForestModel) -> Option<&str> {
    let classes = model.classes();
    classes
        .iter()
        .find(|class| class.as_str() == "1")
        .or_else(|| classes.last())
        .map(String::as_str)
}

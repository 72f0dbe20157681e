//! Regression metrics and the chronological train/test split

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::model::Regressor;

/// Mean squared error. Returns `f64::MAX` for empty or mismatched inputs.
pub fn mse(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return f64::MAX;
    }

    let sum_sq_error: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();

    sum_sq_error / y_true.len() as f64
}

/// Root mean squared error, in target units.
pub fn rmse(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> f64 {
    mse(y_true, y_pred).sqrt()
}

/// Coefficient of determination, `1 - SSres / SStot`.
///
/// Negative when the predictions are worse than the mean of `y_true`. For a
/// constant target the score is 1 on a perfect fit and 0 otherwise. Empty or
/// mismatched inputs score `-inf` so they never win a comparison.
pub fn r2(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> f64 {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return f64::NEG_INFINITY;
    }

    let mean = y_true.sum() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Number of leading rows that go to training: `floor(fraction * n)`.
pub fn train_len(n: usize, train_fraction: f64) -> usize {
    let fraction = train_fraction.clamp(0.0, 1.0);
    ((n as f64 * fraction).floor() as usize).min(n)
}

/// Split time-ordered rows into a leading train part and a trailing test part.
pub fn chronological_split<T>(rows: &[T], train_fraction: f64) -> (&[T], &[T]) {
    rows.split_at(train_len(rows.len(), train_fraction))
}

/// Quality of a trained model on its training data and a held-out split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub test_r2: f64,
    pub test_mse: f64,
    pub test_rmse: f64,
    pub train_r2: f64,
    pub train_mse: f64,
}

/// Score a fitted model against held-out rows.
pub fn evaluate<M: Regressor + ?Sized>(
    model: &M,
    x_test: ArrayView2<f64>,
    y_test: ArrayView1<f64>,
) -> EvaluationResult {
    let predictions = model.predict(x_test);
    let train = model.train_metrics();
    let test_mse = mse(y_test, predictions.view());

    EvaluationResult {
        test_r2: r2(y_test, predictions.view()),
        test_mse,
        test_rmse: test_mse.sqrt(),
        train_r2: train.r2,
        train_mse: train.mse,
    }
}

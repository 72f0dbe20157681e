//! Common interface of the three mood regressors

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::MlConfig;
use super::knn::TrainedKnnModel;
use super::linalg::{LinalgError, SingularMatrixError};
use super::linear::TrainedLinearModel;
use super::tree::TrainedTreeModel;

/// In-sample (or leave-one-out, for KNN) quality computed at fit time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainMetrics {
    pub r2: f64,
    pub mse: f64,
}

/// A fitted, immutable regressor.
pub trait Regressor {
    /// Predict the target for one feature row.
    fn predict_row(&self, row: ArrayView1<f64>) -> f64;

    /// Metrics computed when the model was fitted.
    fn train_metrics(&self) -> TrainMetrics;

    /// Predict every row of `x`.
    fn predict(&self, x: ArrayView2<f64>) -> Array1<f64> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }
}

/// Which estimator a model is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    Knn,
    Tree,
}

impl ModelKind {
    /// Every estimator, in training order.
    pub const ALL: [ModelKind; 3] = [ModelKind::Linear, ModelKind::Knn, ModelKind::Tree];

    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::Linear => "Linear Regression",
            ModelKind::Knn => "K-Nearest Neighbors",
            ModelKind::Tree => "Decision Tree",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Knn => "knn",
            ModelKind::Tree => "tree",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelKind {
    type Err = TrainingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(ModelKind::Linear),
            "knn" => Ok(ModelKind::Knn),
            "tree" => Ok(ModelKind::Tree),
            other => Err(TrainingError::InvalidParameter(format!(
                "unknown model '{}'",
                other
            ))),
        }
    }
}

/// A fitted model of any kind.
#[derive(Debug, Clone)]
pub enum TrainedModel {
    Linear(TrainedLinearModel),
    Knn(TrainedKnnModel),
    Tree(TrainedTreeModel),
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::Linear(_) => ModelKind::Linear,
            TrainedModel::Knn(_) => ModelKind::Knn,
            TrainedModel::Tree(_) => ModelKind::Tree,
        }
    }

    fn as_regressor(&self) -> &dyn Regressor {
        match self {
            TrainedModel::Linear(model) => model,
            TrainedModel::Knn(model) => model,
            TrainedModel::Tree(model) => model,
        }
    }
}

impl Regressor for TrainedModel {
    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        self.as_regressor().predict_row(row)
    }

    fn train_metrics(&self) -> TrainMetrics {
        self.as_regressor().train_metrics()
    }
}

/// Fit the estimator `kind` with the hyperparameters from `config`.
pub fn fit_model(
    kind: ModelKind,
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    config: &MlConfig,
) -> Result<TrainedModel, TrainingError> {
    match kind {
        ModelKind::Linear => TrainedLinearModel::fit(x, y).map(TrainedModel::Linear),
        ModelKind::Knn => TrainedKnnModel::fit(x, y, config.knn_k).map(TrainedModel::Knn),
        ModelKind::Tree => TrainedTreeModel::fit(
            x,
            y,
            config.tree_max_depth,
            config.tree_min_samples_split,
            config.tree_min_gain,
        )
        .map(TrainedModel::Tree),
    }
}

/// Reject empty or misaligned training data.
pub(crate) fn validate_training_data(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
) -> Result<(), TrainingError> {
    if x.nrows() == 0 || y.is_empty() {
        return Err(TrainingError::InsufficientData(0));
    }
    if x.nrows() != y.len() {
        return Err(TrainingError::MismatchedLengths {
            features: x.nrows(),
            targets: y.len(),
        });
    }
    Ok(())
}

/// Errors that can occur during model training
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    /// Not enough data to train
    #[error("insufficient data for training: {0} samples")]
    InsufficientData(usize),
    /// Feature and target arrays have different lengths
    #[error("feature and target lengths mismatch: {features} vs {targets}")]
    MismatchedLengths { features: usize, targets: usize },
    /// Hyperparameter out of range
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// The normal equations could not be solved
    #[error(transparent)]
    SingularMatrix(#[from] SingularMatrixError),
    /// Any other matrix error
    #[error("matrix error: {0}")]
    Linalg(String),
}

impl From<LinalgError> for TrainingError {
    fn from(error: LinalgError) -> Self {
        match error {
            LinalgError::Singular(singular) => TrainingError::SingularMatrix(singular),
            other => TrainingError::Linalg(other.to_string()),
        }
    }
}

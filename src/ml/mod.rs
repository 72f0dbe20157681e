//! Machine learning module for mood forecasting
//!
//! Three regressors (ordinary least squares, distance-weighted KNN and a
//! variance-reduction tree) are trained on a synthetic corpus of daily
//! conditions and moods, compared on a chronological hold-out, and the best
//! one forecasts the coming week.

pub mod corpus;
pub mod evaluation;
pub mod features;
pub mod knn;
pub mod linalg;
pub mod linear;
pub mod model;
pub mod prediction;
pub mod training;
pub mod tree;

use serde::{Deserialize, Serialize};

pub use corpus::{DailyObservation, generate_corpus};
pub use evaluation::{EvaluationResult, evaluate, mse, r2};
pub use features::{DayConditions, FeatureVector, encode};
pub use linalg::SingularMatrixError;
pub use model::{ModelKind, Regressor, TrainedModel, TrainingError};
pub use prediction::{ModelMetrics, ModelPrediction, ModelSelection, PredictionBundle, PredictionPoint};
pub use training::{ForecastError, TrainingRun, forecast_mood, train_models};

/// Configuration for corpus generation and model training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MlConfig {
    /// Days of synthetic history; the corpus holds one more row (today)
    pub corpus_days: u32,
    /// Share of the corpus, oldest first, used for training
    pub train_fraction: f64,
    /// Neighbors consulted by KNN
    pub knn_k: usize,
    /// Maximum number of splits on any tree path
    pub tree_max_depth: usize,
    /// Nodes with fewer samples become leaves
    pub tree_min_samples_split: usize,
    /// Splits reducing variance by less than this are rejected
    pub tree_min_gain: f64,
    /// Forecast days used from the weather forecast
    pub horizon_days: usize,
    /// Fixed corpus seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for MlConfig {
    fn default() -> Self {
        Self {
            corpus_days: 500,
            train_fraction: 0.8,
            knn_k: 5,
            tree_max_depth: 5,
            tree_min_samples_split: 10,
            tree_min_gain: 0.01,
            horizon_days: 7,
            seed: None,
        }
    }
}

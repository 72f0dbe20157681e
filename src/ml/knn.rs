//! Distance-weighted k-nearest-neighbors regression

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::evaluation::{mse, r2};
use super::model::{Regressor, TrainMetrics, TrainingError, validate_training_data};

/// Added to distances before taking the reciprocal.
const DISTANCE_EPSILON: f64 = 1e-5;
/// Weight of a neighbor at distance exactly zero.
const EXACT_MATCH_WEIGHT: f64 = 1000.0;

/// A KNN regressor holding a copy of its training set.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedKnnModel {
    k: usize,
    features: Array2<f64>,
    targets: Array1<f64>,
    train_metrics: TrainMetrics,
}

impl TrainedKnnModel {
    /// Store the training set and score it with leave-one-out.
    ///
    /// In-sample scoring would be trivially perfect, since every point is its
    /// own nearest neighbor.
    pub fn fit(x: ArrayView2<f64>, y: ArrayView1<f64>, k: usize) -> Result<Self, TrainingError> {
        validate_training_data(x, y)?;
        if k == 0 {
            return Err(TrainingError::InvalidParameter(
                "k must be at least 1".to_string(),
            ));
        }

        let mut model = Self {
            k,
            features: x.to_owned(),
            targets: y.to_owned(),
            train_metrics: TrainMetrics { r2: 0.0, mse: 0.0 },
        };

        if x.nrows() > 1 {
            let loo: Array1<f64> = (0..x.nrows())
                .map(|i| model.weighted_average(x.row(i), Some(i)))
                .collect();
            model.train_metrics = TrainMetrics {
                r2: r2(y, loo.view()),
                mse: mse(y, loo.view()),
            };
        } else {
            // A single point has no neighbors to be scored against
            model.train_metrics = TrainMetrics {
                r2: f64::NEG_INFINITY,
                mse: f64::MAX,
            };
        }

        Ok(model)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn training_samples(&self) -> usize {
        self.targets.len()
    }

    /// Weighted mean target of the `k` nearest stored rows, optionally
    /// ignoring the row at `exclude`.
    fn weighted_average(&self, query: ArrayView1<f64>, exclude: Option<usize>) -> f64 {
        let mut neighbors: Vec<(f64, f64)> = self
            .features
            .rows()
            .into_iter()
            .zip(self.targets.iter())
            .enumerate()
            .filter(|(i, _)| Some(*i) != exclude)
            .map(|(_, (row, target))| (euclidean_distance(row, query), *target))
            .collect();

        if neighbors.is_empty() {
            return f64::NAN;
        }

        neighbors.sort_by(|a, b| a.0.total_cmp(&b.0));
        neighbors.truncate(self.k);

        let (weighted_sum, weight_total) = neighbors.iter().fold(
            (0.0, 0.0),
            |(sum, total), (distance, target)| {
                let weight = neighbor_weight(*distance);
                (sum + weight * target, total + weight)
            },
        );

        weighted_sum / weight_total
    }
}

impl Regressor for TrainedKnnModel {
    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        self.weighted_average(row, None)
    }

    fn train_metrics(&self) -> TrainMetrics {
        self.train_metrics
    }
}

fn neighbor_weight(distance: f64) -> f64 {
    if distance == 0.0 {
        EXACT_MATCH_WEIGHT
    } else {
        1.0 / (distance + DISTANCE_EPSILON)
    }
}

pub fn euclidean_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

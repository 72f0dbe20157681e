//! Ordinary least squares via the normal equations

use ndarray::{Array2, ArrayView1, ArrayView2, s};
use serde::{Deserialize, Serialize};

use super::evaluation::{mse, r2};
use super::linalg::{invert, multiply, multiply_vector, transpose};
use super::model::{Regressor, TrainMetrics, TrainingError, validate_training_data};

/// A fitted linear model `y = intercept + coefficients · x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedLinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    pub train_metrics: TrainMetrics,
}

impl TrainedLinearModel {
    /// Solve `β = (XᵀX)⁻¹ Xᵀy` on `x` augmented with a leading ones column.
    ///
    /// Fails with [`TrainingError::SingularMatrix`] when `XᵀX` has no inverse,
    /// e.g. with fewer rows than columns or collinear features.
    pub fn fit(x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<Self, TrainingError> {
        validate_training_data(x, y)?;

        let design = with_intercept_column(x);
        let design_t = transpose(design.view());
        let gram = multiply(design_t.view(), design.view())?;
        let gram_inv = invert(gram.view())?;
        let projection = multiply(gram_inv.view(), design_t.view())?;
        let beta = multiply_vector(projection.view(), y)?;

        let mut model = Self {
            intercept: beta[0],
            coefficients: beta.iter().skip(1).copied().collect(),
            train_metrics: TrainMetrics { r2: 0.0, mse: 0.0 },
        };

        let fitted = model.predict(x);
        model.train_metrics = TrainMetrics {
            r2: r2(y, fitted.view()),
            mse: mse(y, fitted.view()),
        };

        Ok(model)
    }
}

impl Regressor for TrainedLinearModel {
    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row.iter())
                .map(|(c, v)| c * v)
                .sum::<f64>()
    }

    fn train_metrics(&self) -> TrainMetrics {
        self.train_metrics
    }
}

/// `[1 | x]`
fn with_intercept_column(x: ArrayView2<f64>) -> Array2<f64> {
    let mut design = Array2::ones((x.nrows(), x.ncols() + 1));
    design.slice_mut(s![.., 1..]).assign(&x);
    design
}

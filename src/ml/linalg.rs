//! Dense linear algebra for the normal equations.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};
use thiserror::Error;

/// Pivots smaller than this are treated as zero.
pub const PIVOT_EPSILON: f64 = 1e-10;

/// Raised when Gauss-Jordan elimination finds no usable pivot.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("matrix is singular: no pivot above 1e-10 in column {column}")]
pub struct SingularMatrixError {
    pub column: usize,
}

/// Errors from matrix operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinalgError {
    #[error(transparent)]
    Singular(#[from] SingularMatrixError),
    #[error("cannot multiply {left:?} by {right:?}")]
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("matrix must be square, got {0:?}")]
    NotSquare((usize, usize)),
}

pub fn transpose(matrix: ArrayView2<f64>) -> Array2<f64> {
    matrix.t().to_owned()
}

/// Matrix-matrix product with a shape check.
pub fn multiply(left: ArrayView2<f64>, right: ArrayView2<f64>) -> Result<Array2<f64>, LinalgError> {
    if left.ncols() != right.nrows() {
        return Err(LinalgError::DimensionMismatch {
            left: left.dim(),
            right: right.dim(),
        });
    }
    Ok(left.dot(&right))
}

/// Matrix-vector product with a shape check.
pub fn multiply_vector(
    matrix: ArrayView2<f64>,
    vector: ArrayView1<f64>,
) -> Result<Array1<f64>, LinalgError> {
    if matrix.ncols() != vector.len() {
        return Err(LinalgError::DimensionMismatch {
            left: matrix.dim(),
            right: (vector.len(), 1),
        });
    }
    Ok(matrix.dot(&vector))
}

/// Invert a square matrix by Gauss-Jordan elimination on `[A | I]`.
///
/// Rows are swapped so the largest remaining absolute value in each column
/// becomes the pivot. A pivot below [`PIVOT_EPSILON`] fails the inversion.
pub fn invert(matrix: ArrayView2<f64>) -> Result<Array2<f64>, LinalgError> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(LinalgError::NotSquare((rows, cols)));
    }
    let n = rows;

    let mut augmented = Array2::<f64>::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            augmented[[i, j]] = matrix[[i, j]];
        }
        augmented[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| {
                augmented[[a, col]]
                    .abs()
                    .total_cmp(&augmented[[b, col]].abs())
            })
            .unwrap_or(col);

        let pivot = augmented[[pivot_row, col]];
        if pivot.is_nan() || pivot.abs() < PIVOT_EPSILON {
            return Err(SingularMatrixError { column: col }.into());
        }

        if pivot_row != col {
            swap_rows(&mut augmented, pivot_row, col);
        }

        augmented.row_mut(col).mapv_inplace(|v| v / pivot);

        let pivot_values = augmented.row(col).to_owned();
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = augmented[[row, col]];
            if factor == 0.0 {
                continue;
            }
            augmented
                .row_mut(row)
                .scaled_add(-factor, &pivot_values);
        }
    }

    Ok(augmented.slice(s![.., n..]).to_owned())
}

fn swap_rows(matrix: &mut Array2<f64>, a: usize, b: usize) {
    for j in 0..matrix.ncols() {
        matrix.swap([a, j], [b, j]);
    }
}

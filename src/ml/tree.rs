//! Variance-reduction regression tree
//!
//! The tree is grown greedily: every node tries every feature and every
//! midpoint between consecutive distinct values, keeps the split with the
//! largest drop in weighted variance, and recurses until the depth limit, the
//! minimum split size, or the minimum gain stops it.

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::evaluation::{mse, r2};
use super::model::{Regressor, TrainMetrics, TrainingError, validate_training_data};

/// A node of a fitted tree. Children are owned by their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Follow `row` down to a leaf. Values equal to the threshold go left.
    pub fn predict(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Length of the longest root-to-leaf path, counted in splits.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Hyperparameters for growing a tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeOptions {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_gain: f64,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_samples_split: 10,
            min_gain: 0.01,
        }
    }
}

/// A fitted regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedTreeModel {
    pub root: TreeNode,
    pub train_metrics: TrainMetrics,
}

impl TrainedTreeModel {
    pub fn fit(
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        max_depth: usize,
        min_samples_split: usize,
        min_gain: f64,
    ) -> Result<Self, TrainingError> {
        Self::fit_with_options(
            x,
            y,
            TreeOptions {
                max_depth,
                min_samples_split,
                min_gain,
            },
        )
    }

    pub fn fit_with_options(
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        options: TreeOptions,
    ) -> Result<Self, TrainingError> {
        validate_training_data(x, y)?;

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let root = build_node(x, y, &indices, 0, &options);

        let mut model = Self {
            root,
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

impl Regressor for TrainedTreeModel {
    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        self.root.predict(row)
    }

    fn train_metrics(&self) -> TrainMetrics {
        self.train_metrics
    }
}

/// Best split found at a node.
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

fn build_node(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    indices: &[usize],
    depth: usize,
    options: &TreeOptions,
) -> TreeNode {
    let leaf = TreeNode::Leaf {
        value: mean_of(y, indices),
    };

    if depth >= options.max_depth || indices.len() < options.min_samples_split {
        return leaf;
    }

    let Some(split) = find_best_split(x, y, indices) else {
        return leaf;
    };
    if split.gain < options.min_gain {
        return leaf;
    }

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x[[i, split.feature]] <= split.threshold);

    TreeNode::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(build_node(x, y, &left, depth + 1, options)),
        right: Box::new(build_node(x, y, &right, depth + 1, options)),
    }
}

/// Search all features and midpoints for the largest variance reduction.
/// Splits leaving one side empty are never proposed.
fn find_best_split(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    indices: &[usize],
) -> Option<SplitCandidate> {
    let parent_variance = variance_of(y, indices);
    let n = indices.len() as f64;
    let mut best: Option<SplitCandidate> = None;

    for feature in 0..x.ncols() {
        let mut values: Vec<f64> = indices.iter().map(|&i| x[[i, feature]]).collect();
        values.sort_by(f64::total_cmp);
        values.dedup();

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;

            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, feature]] <= threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }

            let weighted_child_variance = (left.len() as f64 * variance_of(y, &left)
                + right.len() as f64 * variance_of(y, &right))
                / n;
            let gain = parent_variance - weighted_child_variance;

            if best.is_none_or(|b| gain > b.gain) {
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    gain,
                });
            }
        }
    }

    best
}

fn mean_of(y: ArrayView1<f64>, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

/// Population variance of the selected targets.
fn variance_of(y: ArrayView1<f64>, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let mean = mean_of(y, indices);
    indices.iter().map(|&i| (y[i] - mean).powi(2)).sum::<f64>() / indices.len() as f64
}

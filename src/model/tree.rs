//! CART regression tree (squared-error splits), the building block of the
//! random forest and the gradient-boosting ensemble.

use crate::model::error::ModelError;
use ndarray::{Array1, Array2, ArrayView1};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

struct Split {
    feature: usize,
    threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    params: TreeParams,
    nodes: Vec<Node>,
}

impl RegressionTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            nodes: Vec::new(),
        }
    }

    /// Fits on the listed rows of `x`/`y`. Rows may repeat (bootstrap samples).
    pub fn fit_rows(
        &mut self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: &[usize],
    ) -> Result<(), ModelError> {
        if rows.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        self.nodes.clear();
        let mut rows = rows.to_vec();
        self.grow(x, y, &mut rows, 0);
        Ok(())
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        let rows: Vec<usize> = (0..x.nrows()).collect();
        self.fit_rows(x, y, &rows)
    }

    /// Grows the subtree for `rows` and returns its root's node index.
    fn grow(&mut self, x: &Array2<f64>, y: &Array1<f64>, rows: &mut [usize], depth: usize) -> usize {
        let n = rows.len() as f64;
        let (sum, sum_sq) = rows
            .iter()
            .fold((0.0, 0.0), |(s, q), &i| (s + y[i], q + y[i] * y[i]));
        let index = self.nodes.len();
        self.nodes.push(Node::Leaf { value: sum / n });

        let node_sse = sum_sq - sum * sum / n;
        let can_deepen = self.params.max_depth.map_or(true, |max| depth < max);
        if !can_deepen || rows.len() < self.params.min_samples_split || node_sse <= 1e-12 {
            return index;
        }
        let Some(split) = self.best_split(x, y, rows, node_sse) else {
            return index;
        };

        rows.sort_by_key(|&i| OrderedFloat(x[[i, split.feature]]));
        let mid = rows.partition_point(|&i| x[[i, split.feature]] <= split.threshold);
        if mid == 0 || mid == rows.len() {
            return index;
        }
        let (left_rows, right_rows) = rows.split_at_mut(mid);
        let left = self.grow(x, y, left_rows, depth + 1);
        let right = self.grow(x, y, right_rows, depth + 1);
        self.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    /// Exhaustive search for the split with the lowest summed child SSE that
    /// improves on the parent.
    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        rows: &[usize],
        node_sse: f64,
    ) -> Option<Split> {
        let n = rows.len();
        let min_leaf = self.params.min_samples_leaf.max(1);
        let (total, total_sq) = rows
            .iter()
            .fold((0.0, 0.0), |(s, q), &i| (s + y[i], q + y[i] * y[i]));

        let mut best: Option<Split> = None;
        let mut best_cost = node_sse - 1e-12;
        let mut order = rows.to_vec();

        for feature in 0..x.ncols() {
            order.sort_by_key(|&i| OrderedFloat(x[[i, feature]]));
            let (mut left_sum, mut left_sq) = (0.0, 0.0);
            for k in 0..n - 1 {
                let i = order[k];
                left_sum += y[i];
                left_sq += y[i] * y[i];

                let n_left = k + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }
                let here = x[[i, feature]];
                let next = x[[order[k + 1], feature]];
                if next <= here {
                    continue;
                }

                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let cost = (left_sq - left_sum * left_sum / n_left as f64)
                    + (right_sq - right_sum * right_sum / n_right as f64);
                if cost < best_cost {
                    best_cost = cost;
                    best = Some(Split {
                        feature,
                        threshold: here + (next - here) / 2.0,
                    });
                }
            }
        }
        best
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { value }) => return *value,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                // Unfitted tree.
                None => return 0.0,
            }
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_step_function_is_learned_exactly() -> Result<(), ModelError> {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = array![5.0, 5.0, 5.0, 20.0, 20.0, 20.0];
        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&x, &y)?;

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.predict(&array![[0.0], [6.4], [6.6], [100.0]]), array![5.0, 5.0, 20.0, 20.0]);
        Ok(())
    }

    #[test]
    fn test_max_depth_limits_growth() -> Result<(), ModelError> {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]];
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let mut stump = RegressionTree::new(TreeParams {
            max_depth: Some(1),
            ..TreeParams::default()
        });
        stump.fit(&x, &y)?;
        assert_eq!(stump.node_count(), 3);

        let mut full = RegressionTree::new(TreeParams::default());
        full.fit(&x, &y)?;
        assert_eq!(full.predict(&x), y);
        Ok(())
    }

    #[test]
    fn test_constant_features_give_single_leaf() -> Result<(), ModelError> {
        let x = array![[1.0], [1.0], [1.0]];
        let y = array![1.0, 2.0, 3.0];
        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&x, &y)?;
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_row(x.row(0)), 2.0);
        Ok(())
    }

    #[test]
    fn test_empty_rows_rejected() {
        let x = Array2::<f64>::zeros((0, 1));
        let y = Array1::<f64>::zeros(0);
        let mut tree = RegressionTree::new(TreeParams::default());
        assert!(matches!(tree.fit(&x, &y), Err(ModelError::EmptyTrainingSet)));
    }
}

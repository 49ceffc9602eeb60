use crate::model::error::ModelError;
use crate::model::tree::{RegressionTree, TreeParams};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Least-squares gradient boosting: starts from the target mean and adds
/// shallow trees fitted to the residuals, each shrunk by `learning_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    init: f64,
    trees: Vec<RegressionTree>,
}

impl Default for GradientBoosting {
    fn default() -> Self {
        Self::new(100, 0.1, 3)
    }
}

impl GradientBoosting {
    pub fn new(n_estimators: usize, learning_rate: f64, max_depth: usize) -> Self {
        Self {
            n_estimators,
            learning_rate,
            max_depth,
            init: 0.0,
            trees: Vec::new(),
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        self.init = y.mean().ok_or(ModelError::EmptyTrainingSet)?;
        self.trees.clear();

        let params = TreeParams {
            max_depth: Some(self.max_depth),
            ..TreeParams::default()
        };
        let mut prediction = Array1::from_elem(y.len(), self.init);
        for _ in 0..self.n_estimators {
            let residual = y - &prediction;
            let mut tree = RegressionTree::new(params);
            tree.fit(x, &residual)?;
            prediction = prediction + tree.predict(x) * self.learning_rate;
            self.trees.push(tree);
        }
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        self.trees
            .iter()
            .fold(Array1::from_elem(x.nrows(), self.init), |acc, tree| {
                acc + tree.predict(x) * self.learning_rate
            })
    }
}

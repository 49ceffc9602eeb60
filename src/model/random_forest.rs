use crate::model::error::ModelError;
use crate::model::tree::{RegressionTree, TreeParams};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Bagged ensemble of fully grown regression trees; predictions are the mean
/// over trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_estimators: usize,
    pub seed: u64,
    pub tree_params: TreeParams,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            seed,
            tree_params: TreeParams::default(),
            trees: Vec::new(),
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        let n = x.nrows();
        if n == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.trees = (0..self.n_estimators)
            .map(|_| {
                let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut tree = RegressionTree::new(self.tree_params);
                tree.fit_rows(x, y, &sample).map(|_| tree)
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        if self.trees.is_empty() {
            return Array1::zeros(x.nrows());
        }
        x.rows()
            .into_iter()
            .map(|row| {
                self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / self.trees.len() as f64
            })
            .collect()
    }
}

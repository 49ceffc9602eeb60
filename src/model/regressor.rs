//! The fixed set of candidate algorithms and the fitted model wrapper the
//! trainer persists.

use crate::model::error::ModelError;
use crate::model::gradient_boosting::GradientBoosting;
use crate::model::linear::LinearRegression;
use crate::model::random_forest::RandomForest;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything that can be fitted on a feature matrix and predict a target.
pub trait Regressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError>;
    fn predict(&self, x: &Array2<f64>) -> Array1<f64>;
}

/// Candidate algorithms, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    RandomForest,
    GradientBoosting,
    LinearRegression,
}

impl Algorithm {
    /// Registration order; ties in model selection go to the earlier entry.
    pub const CANDIDATES: [Algorithm; 3] = [
        Algorithm::RandomForest,
        Algorithm::GradientBoosting,
        Algorithm::LinearRegression,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::RandomForest => "RandomForest",
            Algorithm::GradientBoosting => "GradientBoosting",
            Algorithm::LinearRegression => "LinearRegression",
        }
    }

    /// Fresh, unfitted model with the default hyper-parameters.
    pub fn build(&self, seed: u64) -> Model {
        match self {
            Algorithm::RandomForest => Model::RandomForest(RandomForest::new(150, seed)),
            Algorithm::GradientBoosting => Model::GradientBoosting(GradientBoosting::default()),
            Algorithm::LinearRegression => Model::LinearRegression(LinearRegression::new()),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Model {
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
    LinearRegression(LinearRegression),
}

impl Model {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Model::RandomForest(_) => Algorithm::RandomForest,
            Model::GradientBoosting(_) => Algorithm::GradientBoosting,
            Model::LinearRegression(_) => Algorithm::LinearRegression,
        }
    }
}

impl Regressor for Model {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        if x.nrows() == 0 {
            return Err(ModelError::EmptyTrainingSet);
        }
        if x.nrows() != y.len() {
            return Err(ModelError::ShapeMismatch {
                expected: x.nrows(),
                found: y.len(),
            });
        }
        match self {
            Model::RandomForest(m) => m.fit(x, y),
            Model::GradientBoosting(m) => m.fit(x, y),
            Model::LinearRegression(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        match self {
            Model::RandomForest(m) => m.predict(x),
            Model::GradientBoosting(m) => m.predict(x),
            Model::LinearRegression(m) => m.predict(x),
        }
    }
}

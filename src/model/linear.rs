use crate::model::error::ModelError;
use linfa::prelude::*;
use linfa_linear::FittedLinearRegression;
use ndarray::{concatenate, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Relative ridge term keeping the least-squares problem well posed when
/// columns are constant or collinear.
const JITTER: f64 = 1e-8;

/// Ordinary least squares with an intercept. The intercept is handled by
/// centering, so the fitted linfa model itself has none.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearRegression {
    x_mean: Vec<f64>,
    y_mean: f64,
    fitted: Option<FittedLinearRegression<f64>>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        let x_mean = x.mean_axis(Axis(0)).ok_or(ModelError::EmptyTrainingSet)?;
        let y_mean = y.mean().ok_or(ModelError::EmptyTrainingSet)?;
        let centered = x - &x_mean;

        // One extra row per feature pulls its weight towards zero.
        let p = x.ncols();
        let energy = centered.mapv(|v| v * v).sum() / p.max(1) as f64;
        let ridge = Array2::<f64>::eye(p) * (JITTER * energy.max(1.0)).sqrt();
        let records = concatenate(Axis(0), &[centered.view(), ridge.view()])
            .map_err(|e| ModelError::Fit(e.to_string()))?;
        let targets = concatenate(
            Axis(0),
            &[(y - y_mean).view(), Array1::<f64>::zeros(p).view()],
        )
        .map_err(|e| ModelError::Fit(e.to_string()))?;

        let fitted = linfa_linear::LinearRegression::default()
            .with_intercept(false)
            .fit(&Dataset::new(records, targets))
            .map_err(|e: linfa_linear::LinearError<f64>| ModelError::Fit(e.to_string()))?;

        self.x_mean = x_mean.to_vec();
        self.y_mean = y_mean;
        self.fitted = Some(fitted);
        Ok(())
    }

    /// Predicts the training mean until fitted.
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        match &self.fitted {
            Some(fitted) => {
                let centered = x - &Array1::from(self.x_mean.clone());
                let predicted: Array1<f64> = fitted.predict(&centered);
                predicted + self.y_mean
            }
            None => Array1::from_elem(x.nrows(), self.y_mean),
        }
    }

    pub fn coefficients(&self) -> Vec<f64> {
        self.fitted
            .as_ref()
            .map(|f| f.params().to_vec())
            .unwrap_or_default()
    }

    pub fn intercept(&self) -> f64 {
        let shift: f64 = self
            .x_mean
            .iter()
            .zip(self.coefficients())
            .map(|(m, b)| m * b)
            .sum();
        self.y_mean - shift
    }
}

impl PartialEq for LinearRegression {
    fn eq(&self, other: &Self) -> bool {
        self.x_mean == other.x_mean
            && self.y_mean == other.y_mean
            && self.coefficients() == other.coefficients()
    }
}

use crate::model::error::ModelError;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Zero-mean, unit-variance scaling per column. Columns without variance keep
/// a scale of 1 so they map to zero instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Learns per-column mean and population standard deviation.
    pub fn fit(x: &Array2<f64>) -> Result<Self, ModelError> {
        let mean = x.mean_axis(Axis(0)).ok_or(ModelError::EmptyTrainingSet)?;
        let std = x.std_axis(Axis(0), 0.0);
        let scale = std
            .iter()
            .zip(mean.iter())
            .map(|(s, m)| {
                if *s <= 10.0 * f64::EPSILON * m.abs().max(1.0) {
                    1.0
                } else {
                    *s
                }
            })
            .collect();
        Ok(Self {
            mean: mean.to_vec(),
            scale,
        })
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        if x.ncols() != self.mean.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.mean.len(),
                found: x.ncols(),
            });
        }
        let mean = Array1::from(self.mean.clone());
        let scale = Array1::from(self.scale.clone());
        Ok((x - &mean) / &scale)
    }
}

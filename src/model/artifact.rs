use crate::model::error::ModelError;
use crate::model::matrix::feature_matrix;
use crate::model::regressor::{Algorithm, Model, Regressor};
use crate::model::scaler::StandardScaler;
use chrono::{DateTime, Utc};
use ndarray::Array1;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// A fitted model together with the input columns it was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub algorithm: Algorithm,
    pub feature_names: Vec<String>,
    pub model: Model,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn new(model: Model, feature_names: Vec<String>) -> Self {
        Self {
            algorithm: model.algorithm(),
            feature_names,
            model,
            trained_at: Utc::now(),
        }
    }

    /// Predicts one value per row of a processed frame. Columns are picked by
    /// name in training order, so extra columns in `df` are ignored.
    pub fn predict_frame(
        &self,
        df: &DataFrame,
        scaler: Option<&StandardScaler>,
    ) -> Result<Array1<f64>, ModelError> {
        let x = feature_matrix(df, &self.feature_names)?;
        let x = match scaler {
            Some(scaler) => scaler.transform(&x)?,
            None => x,
        };
        Ok(self.model.predict(&x))
    }
}

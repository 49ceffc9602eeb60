//! Bridges polars frames and the `ndarray` matrices the regressors work on.

use crate::features::processor::numeric_columns;
use crate::model::error::ModelError;
use crate::types::columns::{NON_FEATURES, TARGET};
use ndarray::{Array1, Array2};
use polars::prelude::*;

/// Model input columns of a processed frame: every numeric column except
/// `time`, `us_aqi` and `predicted_aqi`, in frame order.
pub fn feature_columns(df: &DataFrame) -> Vec<String> {
    numeric_columns(df, &NON_FEATURES)
        .into_iter()
        .map(|(name, _)| name)
        .collect()
}

fn float_values(df: &DataFrame, name: &str) -> Result<Float64Chunked, ModelError> {
    let column = df
        .column(name)
        .and_then(|c| c.cast(&DataType::Float64))
        .map_err(|e| ModelError::Column(name.to_string(), e))?;
    column
        .f64()
        .cloned()
        .map_err(|e| ModelError::Column(name.to_string(), e))
}

/// Row-per-record matrix of the named columns, in the given order.
pub fn feature_matrix(df: &DataFrame, names: &[String]) -> Result<Array2<f64>, ModelError> {
    let mut matrix = Array2::<f64>::zeros((df.height(), names.len()));
    for (j, name) in names.iter().enumerate() {
        let values = float_values(df, name)?;
        for (i, value) in values.into_iter().enumerate() {
            matrix[[i, j]] = value.ok_or_else(|| ModelError::MissingValues(name.clone()))?;
        }
    }
    Ok(matrix)
}

pub fn target_vector(df: &DataFrame) -> Result<Array1<f64>, ModelError> {
    float_values(df, TARGET)?
        .into_iter()
        .map(|value| value.ok_or_else(|| ModelError::MissingValues(TARGET.to_string())))
        .collect::<Result<Vec<f64>, _>>()
        .map(Array1::from)
}

use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Cannot fit a model on an empty training set")]
    EmptyTrainingSet,

    #[error("Feature matrix has {found} columns, model expects {expected}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("Required column '{0}' not usable as a numeric feature")]
    Column(String, #[source] PolarsError),

    #[error("Column '{0}' still contains missing values")]
    MissingValues(String),

    #[error("Fitting failed: {0}")]
    Fit(String),

    #[error("Could not score predictions")]
    Scoring(#[from] linfa::Error),
}

use crate::fetch::error::FetchError;
use crate::model::error::ModelError;
use crate::storage::error::PersistenceError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AqiCastError {
    /// An upstream API was unreachable, answered with a non-2xx status or
    /// returned a body without the expected `hourly` schema.
    #[error(transparent)]
    DataFetch(#[from] FetchError),

    /// Nothing left to train on, store or predict after filtering.
    #[error("No data available: {0}")]
    DataUnavailable(String),

    /// Inference was requested before any successful training run.
    #[error("No trained model found at '{0}'")]
    ModelNotFound(PathBuf),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Failed to create directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

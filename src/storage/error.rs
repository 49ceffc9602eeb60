use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to create directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to write '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to move staged file into '{0}'")]
    Persist(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode artifact for '{0}'")]
    Encode(PathBuf, #[source] Box<bincode::error::EncodeError>),

    #[error("Failed to decode artifact '{0}'")]
    Decode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to (de)serialize JSON for '{0}'")]
    Json(PathBuf, #[source] serde_json::Error),

    #[error("Parquet I/O failed for '{0}'")]
    Parquet(PathBuf, #[source] PolarsError),

    #[error("CSV export failed for '{0}'")]
    Csv(PathBuf, #[source] PolarsError),

    #[error("Stored frame at '{0}' is invalid: {1}")]
    InvalidFrame(PathBuf, String),
}

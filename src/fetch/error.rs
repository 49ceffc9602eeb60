use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode JSON body from {0}")]
    JsonDecode(String, #[source] reqwest::Error),

    #[error("Response from {url} is missing the '{field}' field")]
    MissingField { url: String, field: String },

    #[error("Column '{column}' from {url} has {found} values, expected {expected}")]
    LengthMismatch {
        url: String,
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Unexpected value in column '{column}' from {url}: {value}")]
    InvalidValue {
        url: String,
        column: String,
        value: String,
    },

    #[error("Failed building frame from {url}: {source}")]
    Frame {
        url: String,
        #[source]
        source: PolarsError,
    },

    #[error("Failed merging weather and air-quality frames on time")]
    Merge(#[source] PolarsError),
}

mod aqicast;
mod config;
mod error;
mod report;
mod utils;

pub mod features;
pub mod fetch;
pub mod forecast;
pub mod model;
pub mod storage;
pub mod training;
pub mod types;

#[cfg(test)]
mod test_support;

pub use aqicast::AqiCast;
pub use config::{LatLon, Settings, DEFAULT_LOCATION};
pub use error::AqiCastError;
pub use report::{daily_average, AVG_AQI, DATE};
pub use utils::{default_artifact_dir, default_store_dir, get_data_dir};

pub use features::{process, with_target_placeholder};
pub use fetch::{merge_on_time, FetchError, ObservationFetcher};
pub use forecast::{predict, Forecaster};
pub use model::{Algorithm, MetricsRecord, ModelArtifact, ModelError, RegressionMetrics, StandardScaler};
pub use storage::{ArtifactStore, FeatureStore, ParquetFeatureStore, PersistenceError, UpsertSummary};
pub use training::{Trainer, TrainingOutcome};
pub use types::columns::{PREDICTED, TARGET, TIME};
pub use types::date_window::DateWindow;
pub use types::endpoint::{Endpoint, EndpointUrls, WeatherSource};

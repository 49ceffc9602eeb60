//! Runtime settings for the pipeline: location, directories, endpoints and
//! the knobs of the training and forecasting steps.

use crate::types::endpoint::EndpointUrls;
use crate::utils::{default_artifact_dir, default_store_dir};
use bon::Builder;
use std::path::PathBuf;
use std::time::Duration;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use aqicast::LatLon;
///
/// let karachi = LatLon(24.8608, 67.0104);
/// assert_eq!(karachi.0, 24.8608); // Latitude
/// assert_eq!(karachi.1, 67.0104); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// Karachi, the location the pipeline was built for.
pub const DEFAULT_LOCATION: LatLon = LatLon(24.8608, 67.0104);

/// Configuration shared by the fetcher, the stores, the trainer and the forecaster.
///
/// Every field has a default, so `Settings::builder().build()` is a working
/// configuration.
///
/// # Examples
///
/// ```
/// use aqicast::{LatLon, Settings};
/// use std::time::Duration;
///
/// let settings = Settings::builder()
///     .location(LatLon(52.52, 13.40))
///     .request_timeout(Duration::from_secs(10))
///     .build();
/// assert_eq!(settings.seed, 42);
/// assert_eq!(settings.forecast_days, 3);
/// ```
#[derive(Debug, Clone, Builder)]
pub struct Settings {
    #[builder(default = DEFAULT_LOCATION)]
    pub location: LatLon,

    /// Directory holding the feature store file.
    #[builder(default = default_store_dir())]
    pub data_dir: PathBuf,

    /// Directory holding the model, scaler and metrics files.
    #[builder(default = default_artifact_dir())]
    pub artifact_dir: PathBuf,

    #[builder(default)]
    pub endpoints: EndpointUrls,

    /// Upper bound for every HTTP request.
    #[builder(default = Duration::from_secs(30))]
    pub request_timeout: Duration,

    /// Length of the history window fetched by a full ingest.
    #[builder(default = 365)]
    pub history_days: u32,

    /// History is fetched in chunks of this many days.
    #[builder(default = 30)]
    pub chunk_days: u32,

    /// Days ahead (starting tomorrow) covered by a forecast.
    #[builder(default = 3)]
    pub forecast_days: u32,

    /// Seed for the train/test split and for bootstrapping.
    #[builder(default = 42)]
    pub seed: u64,

    #[builder(default = 0.2)]
    pub test_fraction: f64,

    /// Apply the fitted scaler to forecast inputs before prediction.
    #[builder(default = true)]
    pub scale_inputs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::builder().build()
    }
}

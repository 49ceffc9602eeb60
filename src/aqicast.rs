//! The main entry point: one client that ingests observations into the feature
//! store, trains models on them and forecasts with the best one.

use crate::config::Settings;
use crate::error::AqiCastError;
use crate::features::process;
use crate::fetch::ObservationFetcher;
use crate::forecast::Forecaster;
use crate::model::MetricsRecord;
use crate::report::daily_average;
use crate::storage::raw_export::write_raw_csv;
use crate::storage::{ArtifactStore, FeatureStore, ParquetFeatureStore, UpsertSummary};
use crate::training::{Trainer, TrainingOutcome};
use crate::types::date_window::DateWindow;
use crate::utils::ensure_dir_exists;
use bon::bon;
use chrono::{DateTime, Utc};
use log::{info, warn};
use polars::prelude::DataFrame;
use std::path::{Path, PathBuf};
use tokio::task;

/// Client tying the fetcher, the feature store, the trainer and the
/// forecaster together.
///
/// Every handle is constructed once from [`Settings`] and owned by the
/// client; nothing is process-global.
///
/// # Examples
///
/// ```rust,no_run
/// # use aqicast::{AqiCast, AqiCastError};
/// # async fn run() -> Result<(), AqiCastError> {
/// let client = AqiCast::new()?;
/// client.ingest().days(30).call().await?;
/// let outcome = client.train().call().await?;
/// println!("best model: {}", outcome.best_model_name);
/// let predictions = client.forecast().await?;
/// println!("{}", predictions);
/// # Ok(())
/// # }
/// ```
pub struct AqiCast {
    settings: Settings,
    fetcher: ObservationFetcher,
    store: ParquetFeatureStore,
    artifacts: ArtifactStore,
    trainer: Trainer,
    forecaster: Forecaster,
}

#[bon]
impl AqiCast {
    /// Client with default [`Settings`] (Karachi, platform data directory).
    pub fn new() -> Result<Self, AqiCastError> {
        Self::with_settings(Settings::default())
    }

    /// Creates the data and artifact directories if needed and opens the
    /// feature store.
    pub fn with_settings(settings: Settings) -> Result<Self, AqiCastError> {
        for dir in [&settings.data_dir, &settings.artifact_dir] {
            ensure_dir_exists(dir).map_err(|e| AqiCastError::DirCreation(dir.clone(), e))?;
        }
        let fetcher = ObservationFetcher::from_settings(&settings)?;
        let store = ParquetFeatureStore::open(&settings.data_dir)?;
        let artifacts = ArtifactStore::new(&settings.artifact_dir);
        Ok(Self::from_parts(settings, fetcher, store, artifacts))
    }

    /// Assembles a client from handles opened by the caller.
    pub fn from_parts(
        settings: Settings,
        fetcher: ObservationFetcher,
        store: ParquetFeatureStore,
        artifacts: ArtifactStore,
    ) -> Self {
        let trainer = Trainer::from_settings(&settings);
        let forecaster = Forecaster::from_settings(fetcher.clone(), artifacts.clone(), &settings);
        Self {
            settings,
            fetcher,
            store,
            artifacts,
            trainer,
            forecaster,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn feature_store(&self) -> &ParquetFeatureStore {
        &self.store
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Fetches archived observations, processes them and upserts them into
    /// the feature store.
    ///
    /// * `.days(u32)`: length of the trailing window ending today. Defaults to
    ///   `Settings::history_days`.
    /// * `.today_only(bool)`: fetch only today's data, ignoring `days`.
    /// * `.raw_csv(PathBuf)`: also write the merged, unprocessed batch as CSV.
    #[builder]
    pub async fn ingest(
        &self,
        days: Option<u32>,
        #[builder(default)] today_only: bool,
        raw_csv: Option<PathBuf>,
    ) -> Result<UpsertSummary, AqiCastError> {
        let today = Utc::now().date_naive();
        let window = if today_only {
            DateWindow::day(today)
        } else {
            DateWindow::trailing(today, days.unwrap_or(self.settings.history_days))
        };
        self.ingest_window(window, raw_csv.as_deref()).await
    }

    /// Full history ingest with the configured window.
    pub async fn ingest_history(&self) -> Result<UpsertSummary, AqiCastError> {
        self.ingest().call().await
    }

    pub async fn ingest_window(
        &self,
        window: DateWindow,
        raw_csv: Option<&Path>,
    ) -> Result<UpsertSummary, AqiCastError> {
        let raw = self
            .fetcher
            .fetch_history(window, self.settings.chunk_days)
            .await?;
        if raw.height() == 0 {
            return Err(AqiCastError::DataUnavailable(format!(
                "no observations returned for {}",
                window
            )));
        }

        let store = self.store.clone();
        let raw_csv = raw_csv.map(Path::to_path_buf);
        task::spawn_blocking(move || {
            if let Some(path) = raw_csv {
                write_raw_csv(&raw, &path)?;
            }
            let features = process(raw)?;
            if features.height() == 0 {
                return Err(AqiCastError::DataUnavailable(
                    "every fetched record was dropped during processing".to_string(),
                ));
            }
            Ok::<_, AqiCastError>(store.upsert(&features)?)
        })
        .await?
    }

    /// Trains every candidate on the stored features between `start` and
    /// `end` (both optional, inclusive) and persists the best model, the
    /// scaler and the metrics.
    #[builder]
    pub async fn train(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<TrainingOutcome, AqiCastError> {
        let store = self.store.clone();
        let trainer = self.trainer.clone();
        let artifacts = self.artifacts.clone();
        task::spawn_blocking(move || {
            let features = store.query(start, end)?;
            info!("Loaded {} feature records for training", features.height());
            let outcome = trainer.train(&features)?;
            artifacts.save(&outcome)?;
            Ok::<_, AqiCastError>(outcome)
        })
        .await?
    }

    /// Hourly predictions for the configured forecast horizon.
    pub async fn forecast(&self) -> Result<DataFrame, AqiCastError> {
        self.forecaster.forecast().await
    }

    /// Forecast averaged per calendar date.
    pub async fn forecast_daily(&self) -> Result<DataFrame, AqiCastError> {
        let predictions = self.forecast().await?;
        Ok(daily_average(&predictions)?)
    }

    /// Metrics of the latest training run, `None` if there was none.
    pub fn metrics(&self) -> Result<Option<MetricsRecord>, AqiCastError> {
        let metrics = self.artifacts.load_metrics()?;
        if metrics.is_none() {
            warn!("No metrics at {:?}", self.artifacts.metrics_path());
        }
        Ok(metrics)
    }
}

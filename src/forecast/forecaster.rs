use crate::config::Settings;
use crate::error::AqiCastError;
use crate::features::{process, with_target_placeholder};
use crate::fetch::ObservationFetcher;
use crate::model::{ModelArtifact, StandardScaler};
use crate::storage::ArtifactStore;
use crate::types::columns::PREDICTED;
use crate::types::date_window::DateWindow;
use crate::types::endpoint::WeatherSource;
use chrono::{NaiveDate, Utc};
use log::{debug, info};
use polars::prelude::*;
use tokio::task;

/// Predicts `us_aqi` for the coming days with the latest persisted model.
#[derive(Debug, Clone)]
pub struct Forecaster {
    fetcher: ObservationFetcher,
    artifacts: ArtifactStore,
    horizon_days: u32,
    scale_inputs: bool,
}

impl Forecaster {
    pub fn new(
        fetcher: ObservationFetcher,
        artifacts: ArtifactStore,
        horizon_days: u32,
        scale_inputs: bool,
    ) -> Self {
        Self {
            fetcher,
            artifacts,
            horizon_days,
            scale_inputs,
        }
    }

    pub fn from_settings(
        fetcher: ObservationFetcher,
        artifacts: ArtifactStore,
        settings: &Settings,
    ) -> Self {
        Self::new(
            fetcher,
            artifacts,
            settings.forecast_days,
            settings.scale_inputs,
        )
    }

    /// Forecast for tomorrow through `horizon_days` ahead (UTC).
    pub async fn forecast(&self) -> Result<DataFrame, AqiCastError> {
        self.forecast_from(Utc::now().date_naive()).await
    }

    /// Loads the model, fetches the window after `today` and returns the
    /// processed records with a `predicted_aqi` column.
    ///
    /// Fails with [`AqiCastError::ModelNotFound`] before any request is made
    /// when no model has been trained.
    pub async fn forecast_from(&self, today: NaiveDate) -> Result<DataFrame, AqiCastError> {
        let artifacts = self.artifacts.clone();
        let scale_inputs = self.scale_inputs;
        let (artifact, scaler) = task::spawn_blocking(move || {
            let artifact = artifacts.load_model()?;
            let scaler = if scale_inputs {
                Some(artifacts.load_scaler()?)
            } else {
                None
            };
            Ok::<_, AqiCastError>((artifact, scaler))
        })
        .await??;
        debug!(
            "Loaded {} model trained at {}",
            artifact.algorithm, artifact.trained_at
        );

        let window = DateWindow::forecast(today, self.horizon_days);
        let raw = self
            .fetcher
            .fetch_observations(window, WeatherSource::Forecast)
            .await?;
        let predictions = predict(raw, &artifact, scaler.as_ref())?;
        info!("Forecast {} hourly values for {}", predictions.height(), window);
        Ok(predictions)
    }
}

/// Runs a raw forecast batch through the feature processor and appends the
/// model's output as `predicted_aqi`. A missing target column is added as an
/// all-null placeholder so every row is kept.
pub fn predict(
    raw: DataFrame,
    artifact: &ModelArtifact,
    scaler: Option<&StandardScaler>,
) -> Result<DataFrame, AqiCastError> {
    if raw.height() == 0 {
        return Err(AqiCastError::DataUnavailable(
            "forecast window returned no records".to_string(),
        ));
    }
    let mut features = process(with_target_placeholder(raw)?)?;
    let predicted = artifact.predict_frame(&features, scaler)?;
    features.with_column(Series::new(PREDICTED.into(), predicted.to_vec()))?;
    Ok(features)
}

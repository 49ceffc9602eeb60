use crate::config::Settings;
use crate::error::AqiCastError;
use crate::features::process;
use crate::model::matrix::{feature_columns, feature_matrix, target_vector};
use crate::model::split::train_test_split;
use crate::model::{
    Algorithm, MetricsRecord, ModelArtifact, RegressionMetrics, Regressor, StandardScaler,
};
use crate::types::columns::TARGET;
use bon::Builder;
use log::{debug, info};
use ndarray::Axis;
use polars::prelude::*;

/// Result of a training run: the winner, every candidate's scores and the
/// fitted model and scaler.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub best_model_name: String,
    pub metrics: MetricsRecord,
    pub model: ModelArtifact,
    pub scaler: StandardScaler,
}

/// Fits every candidate on the same split and keeps the one with the best
/// test R².
#[derive(Debug, Clone, Builder)]
pub struct Trainer {
    #[builder(default = 42)]
    seed: u64,
    #[builder(default = 0.2)]
    test_fraction: f64,
    #[builder(default = Algorithm::CANDIDATES.to_vec())]
    candidates: Vec<Algorithm>,
}

impl Default for Trainer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Trainer {
    pub fn from_settings(settings: &Settings) -> Self {
        Self::builder()
            .seed(settings.seed)
            .test_fraction(settings.test_fraction)
            .build()
    }

    pub fn train(&self, features: &DataFrame) -> Result<TrainingOutcome, AqiCastError> {
        if features.height() == 0 {
            return Err(AqiCastError::DataUnavailable(
                "no feature records to train on".to_string(),
            ));
        }
        if features.column(TARGET).is_err() {
            return Err(AqiCastError::DataUnavailable(format!(
                "feature records have no '{}' column",
                TARGET
            )));
        }

        let labelled = features
            .clone()
            .lazy()
            .filter(col(TARGET).is_not_null())
            .collect()?;
        let dropped = features.height() - labelled.height();
        if dropped > 0 {
            debug!("Dropped {} records without a target", dropped);
        }
        let data = process(labelled)?;
        if data.height() < 2 {
            return Err(AqiCastError::DataUnavailable(format!(
                "need at least 2 labelled records, found {}",
                data.height()
            )));
        }

        let feature_names = feature_columns(&data);
        let x = feature_matrix(&data, &feature_names)?;
        let y = target_vector(&data)?;
        let split = train_test_split(data.height(), self.test_fraction, self.seed);
        info!(
            "Training on {} records ({} train, {} test) with {} features",
            data.height(),
            split.train.len(),
            split.test.len(),
            feature_names.len()
        );

        let x_train = x.select(Axis(0), &split.train);
        let x_test = x.select(Axis(0), &split.test);
        let y_train = y.select(Axis(0), &split.train);
        let y_test = y.select(Axis(0), &split.test);

        let scaler = StandardScaler::fit(&x_train)?;
        let x_train = scaler.transform(&x_train)?;
        let x_test = scaler.transform(&x_test)?;

        let mut metrics = MetricsRecord::new();
        let mut fitted = Vec::with_capacity(self.candidates.len());
        for algorithm in &self.candidates {
            let mut model = algorithm.build(self.seed);
            model.fit(&x_train, &y_train)?;
            let scores = RegressionMetrics::evaluate(&y_test, &model.predict(&x_test))?;
            info!(
                "{}: MAE={:.3} RMSE={:.3} R2={:.4}",
                algorithm, scores.mae, scores.rmse, scores.r2
            );
            metrics.push(algorithm.name(), scores);
            fitted.push(model);
        }

        let best_name = metrics
            .best()
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| {
                AqiCastError::DataUnavailable("no candidate produced a usable score".to_string())
            })?;
        let model = fitted
            .into_iter()
            .find(|m| m.algorithm().name() == best_name)
            .ok_or_else(|| AqiCastError::DataUnavailable(format!("no fitted {}", best_name)))?;
        info!("Best model: {}", best_name);

        Ok(TrainingOutcome {
            best_model_name: best_name,
            metrics,
            model: ModelArtifact::new(model, feature_names),
            scaler,
        })
    }
}

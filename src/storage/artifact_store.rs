use crate::error::AqiCastError;
use crate::model::{MetricsRecord, ModelArtifact, StandardScaler};
use crate::storage::error::PersistenceError;
use crate::training::TrainingOutcome;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const MODEL_FILE_NAME: &str = "best_model.bin";
pub const SCALER_FILE_NAME: &str = "scaler.bin";
pub const METRICS_FILE_NAME: &str = "model_metrics.json";

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Directory holding the latest model, scaler and metrics files.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE_NAME)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.dir.join(SCALER_FILE_NAME)
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.dir.join(METRICS_FILE_NAME)
    }

    /// Writes metrics, scaler and model. All three are encoded into temp files
    /// first; if moving one into place fails, the ones already moved are
    /// removed again.
    pub fn save(&self, outcome: &TrainingOutcome) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| PersistenceError::DirCreation(self.dir.clone(), e))?;

        let metrics_path = self.metrics_path();
        let metrics_json = serde_json::to_vec_pretty(&outcome.metrics)
            .map_err(|e| PersistenceError::Json(metrics_path.clone(), e))?;
        let scaler_path = self.scaler_path();
        let scaler_bytes = encode(&outcome.scaler, &scaler_path)?;
        let model_path = self.model_path();
        let model_bytes = encode(&outcome.model, &model_path)?;

        // Model last: its presence marks a complete run.
        let staged = vec![
            (self.stage(&metrics_json, &metrics_path)?, metrics_path),
            (self.stage(&scaler_bytes, &scaler_path)?, scaler_path),
            (self.stage(&model_bytes, &model_path)?, model_path),
        ];

        let mut persisted: Vec<PathBuf> = Vec::with_capacity(staged.len());
        for (file, path) in staged {
            if let Err(e) = file.persist(&path) {
                for done in &persisted {
                    if let Err(cleanup) = fs::remove_file(done) {
                        warn!("Could not remove {:?} after failed save: {}", done, cleanup);
                    }
                }
                return Err(PersistenceError::Persist(path, e.error));
            }
            persisted.push(path);
        }

        info!(
            "Saved {} model, scaler and metrics to {:?}",
            outcome.best_model_name, self.dir
        );
        Ok(())
    }

    fn stage(&self, bytes: &[u8], target: &Path) -> Result<NamedTempFile, PersistenceError> {
        let mut file = NamedTempFile::new_in(&self.dir)
            .map_err(|e| PersistenceError::Write(target.to_path_buf(), e))?;
        file.write_all(bytes)
            .and_then(|_| file.as_file().sync_all())
            .map_err(|e| PersistenceError::Write(target.to_path_buf(), e))?;
        Ok(file)
    }

    /// Fails with [`AqiCastError::ModelNotFound`] when no model was saved yet.
    pub fn load_model(&self) -> Result<ModelArtifact, AqiCastError> {
        let path = self.model_path();
        if !path.exists() {
            return Err(AqiCastError::ModelNotFound(path));
        }
        Ok(decode(&path)?)
    }

    pub fn load_scaler(&self) -> Result<StandardScaler, AqiCastError> {
        let path = self.scaler_path();
        if !path.exists() {
            return Err(AqiCastError::ModelNotFound(path));
        }
        Ok(decode(&path)?)
    }

    /// `None` when no training run has completed.
    pub fn load_metrics(&self) -> Result<Option<MetricsRecord>, PersistenceError> {
        let path = self.metrics_path();
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).map_err(|e| PersistenceError::Read(path.clone(), e))?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| PersistenceError::Json(path, e))
    }
}

fn encode<T: Serialize>(value: &T, path: &Path) -> Result<Vec<u8>, PersistenceError> {
    bincode::serde::encode_to_vec(value, BINCODE_CONFIG)
        .map_err(|e| PersistenceError::Encode(path.to_path_buf(), Box::new(e)))
}

fn decode<T: DeserializeOwned>(path: &Path) -> Result<T, PersistenceError> {
    let bytes = fs::read(path).map_err(|e| PersistenceError::Read(path.to_path_buf(), e))?;
    bincode::serde::decode_from_slice::<T, _>(&bytes, BINCODE_CONFIG)
        .map(|(value, _)| value)
        .map_err(|e| PersistenceError::Decode(path.to_path_buf(), Box::new(e)))
}

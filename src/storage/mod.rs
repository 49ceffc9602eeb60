pub mod artifact_store;
pub mod error;
pub mod feature_store;
pub mod raw_export;

pub use artifact_store::ArtifactStore;
pub use error::PersistenceError;
pub use feature_store::{FeatureStore, ParquetFeatureStore, UpsertSummary};

pub mod artifact;
pub mod error;
pub mod gradient_boosting;
pub mod linear;
pub mod matrix;
pub mod metrics;
pub mod random_forest;
pub mod regressor;
pub mod scaler;
pub mod split;
pub mod tree;

pub use artifact::ModelArtifact;
pub use error::ModelError;
pub use metrics::{MetricsRecord, RegressionMetrics};
pub use regressor::{Algorithm, Model, Regressor};
pub use scaler::StandardScaler;

pub mod trainer;

pub use trainer::{Trainer, TrainingOutcome};

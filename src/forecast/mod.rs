pub mod forecaster;

pub use forecaster::{predict, Forecaster};

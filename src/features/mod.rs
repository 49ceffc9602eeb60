pub mod processor;

pub use processor::{process, with_target_placeholder};

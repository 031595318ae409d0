//! Batched field intensity scan over mesh nodes.

pub mod batches;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod sample;

pub use batches::{Batches, batches, num_batches};
pub use config::BatchConfig;
pub use error::ScanError;
pub use evaluator::{ScanProgress, evaluate, evaluate_with_progress};
pub use sample::{IntensityResult, LensCorrection, SamplePoint};

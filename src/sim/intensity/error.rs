//! Error types for intensity scans.

use thiserror::Error;

/// Failure of a whole scan run. No partial result accompanies either variant.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid scan configuration: {0}")]
    InvalidConfig(String),

    #[error("Field evaluation failed for batch {batch} (nodes {start}..{end})")]
    EvaluationFailed {
        batch: usize,
        start: usize,
        end: usize,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScanError>;

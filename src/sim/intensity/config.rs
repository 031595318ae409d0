use serde::{Deserialize, Serialize};

use super::error::{Result, ScanError};

/// Batching and parallelism settings of an intensity scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of nodes passed to the pressure field in one call.
    pub step_size: usize,
    /// Worker threads requested from the pressure field.
    pub threads: usize,
}

impl BatchConfig {
    pub fn new() -> Self {
        Self {
            step_size: 20000,
            threads: 1,
        }
    }

    pub fn with_step_size(mut self, step_size: usize) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Checks that both the step size and the thread count are at least 1.
    pub fn validate(&self) -> Result<()> {
        if self.step_size < 1 {
            return Err(ScanError::InvalidConfig(format!(
                "step_size must be >= 1, got {}",
                self.step_size
            )));
        }
        if self.threads < 1 {
            return Err(ScanError::InvalidConfig(format!(
                "threads must be >= 1, got {}",
                self.threads
            )));
        }
        Ok(())
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

//! Run configuration of the `fieldscan` binary.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::sim::field::{PointSourceArray, PulseParams};
use crate::sim::intensity::{BatchConfig, LensCorrection};
use crate::{Point, Vector};

/// Everything needed to run a scan apart from the node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub batch: BatchConfig,
    /// Offset added to every node position before field evaluation.
    pub lens_correction: Vector,
    pub field: PulseParams,
    /// Transducer element centres.
    pub elements: Vec<Point>,
}

impl ScanConfig {
    /// Default transducer: 16 elements, 0.2 mm pitch along x.
    pub const DEFAULT_NUM_ELEMENTS: usize = 16;
    pub const DEFAULT_PITCH: f64 = 2e-4;

    pub fn new() -> Self {
        let center = (Self::DEFAULT_NUM_ELEMENTS as f64 - 1.0) / 2.0;
        let elements = (0..Self::DEFAULT_NUM_ELEMENTS)
            .map(|i| Point::new((i as f64 - center) * Self::DEFAULT_PITCH, 0.0, 0.0))
            .collect();
        Self {
            batch: BatchConfig::new(),
            lens_correction: Vector::default(),
            field: PulseParams::new(),
            elements,
        }
    }

    pub fn correction(&self) -> LensCorrection {
        LensCorrection::new(self.lens_correction)
    }

    /// Builds the transducer model described by this configuration.
    pub fn build_field(&self) -> Result<PointSourceArray> {
        PointSourceArray::new(self.elements.clone(), self.field)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}

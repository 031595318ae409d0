use serde::{Deserialize, Serialize};

use crate::{Point, Vector};

/// A mesh node at which the field intensity is evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub id: u64,
    pub position: Point,
}

impl SamplePoint {
    pub fn new(id: u64, position: Point) -> Self {
        Self { id, position }
    }
}

/// Constant offset applied to every sample point before field evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LensCorrection {
    pub offset: Vector,
}

impl LensCorrection {
    pub fn new(offset: Vector) -> Self {
        Self { offset }
    }

    /// Zero offset.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn apply(&self, point: Point) -> Point {
        point + self.offset
    }
}

/// Per-node intensities of one scan, in input order.
///
/// Deserialization rejects records whose id and intensity counts differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IntensityRecord")]
pub struct IntensityResult {
    pub node_ids: Vec<u64>,
    pub intensity: Vec<f64>,
}

/// Unchecked on-disk form of [`IntensityResult`].
#[derive(Deserialize)]
struct IntensityRecord {
    node_ids: Vec<u64>,
    intensity: Vec<f64>,
}

impl TryFrom<IntensityRecord> for IntensityResult {
    type Error = String;

    fn try_from(record: IntensityRecord) -> Result<Self, Self::Error> {
        if record.node_ids.len() != record.intensity.len() {
            return Err(format!(
                "{} node ids but {} intensity values",
                record.node_ids.len(),
                record.intensity.len()
            ));
        }
        Ok(Self {
            node_ids: record.node_ids,
            intensity: record.intensity,
        })
    }
}

impl IntensityResult {
    /// Creates a zero-filled result sized for `points`.
    pub(crate) fn preallocated(points: &[SamplePoint]) -> Self {
        Self {
            node_ids: points.iter().map(|p| p.id).collect(),
            intensity: vec![0.0; points.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.intensity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensity.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.intensity
    }

    /// Iterates over `(node_id, intensity)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.node_ids
            .iter()
            .copied()
            .zip(self.intensity.iter().copied())
    }

    /// Largest intensity, or `None` for an empty result.
    pub fn max(&self) -> Option<f64> {
        self.intensity.iter().copied().reduce(f64::max)
    }

    /// Returns a copy scaled so that the peak intensity equals 1.
    ///
    /// If the peak is zero the values are returned unchanged.
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        if let Some(peak) = self.max()
            && peak > 0.0
        {
            for v in out.intensity.iter_mut() {
                *v /= peak;
            }
        }
        out
    }
}

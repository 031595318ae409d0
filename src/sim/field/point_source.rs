use std::f64::consts::PI;

use anyhow::{Context, Result, bail};
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::PressureField;
use crate::Point;

/// Excitation and sampling parameters of a [`PointSourceArray`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseParams {
    /// Tone burst centre frequency (Hz).
    pub center_frequency: f64,
    /// Speed of sound in the medium (m/s).
    pub sound_speed: f64,
    /// Waveform sampling frequency (Hz).
    pub sampling_frequency: f64,
    /// Number of cycles in the Hann-windowed tone burst.
    pub num_cycles: usize,
    /// Samples per waveform, counted from the first arrival.
    pub num_samples: usize,
    /// Distances below this value (m) are clamped to avoid the 1/r singularity.
    pub min_distance: f64,
}

impl PulseParams {
    pub fn new() -> Self {
        Self {
            center_frequency: 7.2e6,
            sound_speed: 1540.0,
            sampling_frequency: 100e6,
            num_cycles: 2,
            num_samples: 512,
            min_distance: 1e-4,
        }
    }

    /// Length of the tone burst (s).
    pub fn duration(&self) -> f64 {
        self.num_cycles as f64 / self.center_frequency
    }

    /// Excitation value at time `t` after emission.
    pub fn burst(&self, t: f64) -> f64 {
        let duration = self.duration();
        if !(0.0..=duration).contains(&t) {
            return 0.0;
        }
        let window = 0.5 * (1.0 - (2.0 * PI * t / duration).cos());
        window * (2.0 * PI * self.center_frequency * t).sin()
    }

    pub fn validate(&self) -> Result<()> {
        if self.center_frequency <= 0.0 {
            bail!("center_frequency must be positive, got {}", self.center_frequency);
        }
        if self.sound_speed <= 0.0 {
            bail!("sound_speed must be positive, got {}", self.sound_speed);
        }
        if self.sampling_frequency <= 0.0 {
            bail!(
                "sampling_frequency must be positive, got {}",
                self.sampling_frequency
            );
        }
        if self.num_cycles == 0 {
            bail!("num_cycles must be at least 1");
        }
        if self.num_samples == 0 {
            bail!("num_samples must be at least 1");
        }
        if self.min_distance <= 0.0 {
            bail!("min_distance must be positive, got {}", self.min_distance);
        }
        Ok(())
    }
}

impl Default for PulseParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Transducer modelled as a set of omnidirectional point sources fired together.
///
/// The pressure at a point is the sum of the element tone bursts, each delayed
/// by its travel time and attenuated by spherical spreading (1/r). The sampled
/// window starts at the first arrival.
pub struct PointSourceArray {
    elements: Vec<Point>,
    params: PulseParams,
    pool: Option<rayon::ThreadPool>,
}

impl PointSourceArray {
    pub fn new(elements: Vec<Point>, params: PulseParams) -> Result<Self> {
        if elements.is_empty() {
            bail!("Point source array needs at least one element");
        }
        params.validate().context("Invalid pulse parameters")?;
        Ok(Self {
            elements,
            params,
            pool: None,
        })
    }

    /// Creates a linear array along the x-axis, centred on the origin.
    pub fn linear(num_elements: usize, pitch: f64, params: PulseParams) -> Result<Self> {
        let center = (num_elements as f64 - 1.0) / 2.0;
        let elements = (0..num_elements)
            .map(|i| Point::new((i as f64 - center) * pitch, 0.0, 0.0))
            .collect();
        Self::new(elements, params)
    }

    pub fn elements(&self) -> &[Point] {
        &self.elements
    }

    pub fn params(&self) -> &PulseParams {
        &self.params
    }

    /// Worker threads used by [`PressureField::pressure`].
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Pressure waveform at a single point.
    pub fn waveform(&self, point: Point) -> Vec<f64> {
        let c = self.params.sound_speed;
        let dt = 1.0 / self.params.sampling_frequency;

        let distances: Vec<f64> = self.elements.iter().map(|e| e.distance(&point)).collect();
        let r_min = distances.iter().copied().fold(f64::INFINITY, f64::min);
        let t0 = r_min / c;

        (0..self.params.num_samples)
            .map(|k| {
                let t = t0 + k as f64 * dt;
                distances
                    .iter()
                    .map(|&r| self.params.burst(t - r / c) / r.max(self.params.min_distance))
                    .sum()
            })
            .collect()
    }
}

impl PressureField for PointSourceArray {
    fn set_threads(&mut self, threads: usize) -> Result<()> {
        if threads == 0 {
            bail!("Thread count must be at least 1");
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to build field worker pool")?;
        log::debug!("Point source array using {threads} worker threads");
        self.pool = Some(pool);
        Ok(())
    }

    fn pressure(&mut self, points: &[Point]) -> Result<Array2<f64>> {
        let num_samples = self.params.num_samples;
        let this = &*self;
        let compute = || {
            points
                .par_iter()
                .map(|p| this.waveform(*p))
                .collect::<Vec<Vec<f64>>>()
        };
        let rows = match &this.pool {
            Some(pool) => pool.install(compute),
            None => compute(),
        };

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((points.len(), num_samples), flat)
            .context("Waveform buffer does not match the requested shape")
    }
}

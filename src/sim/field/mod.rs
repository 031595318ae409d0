//! Pressure field models.
//!
//! A [`PressureField`] computes the pressure response at a batch of points.
//! The scan in [`crate::sim::intensity`] only talks to fields through this
//! trait, so an external engine can be plugged in next to the built-in
//! [`PointSourceArray`].

use anyhow::Result;
use ndarray::Array2;

use crate::Point;

pub mod point_source;

pub use point_source::{PointSourceArray, PulseParams};

/// Evaluates acoustic pressure at batches of points.
pub trait PressureField {
    /// Requests `threads` worker threads for subsequent [`pressure`] calls.
    ///
    /// Called once per scan, before the first batch. Fields without internal
    /// parallelism can ignore it.
    ///
    /// [`pressure`]: PressureField::pressure
    fn set_threads(&mut self, _threads: usize) -> Result<()> {
        Ok(())
    }

    /// Returns one row per input point, in input order.
    ///
    /// Each row holds the pressure waveform at that point. A field producing a
    /// single value per point returns a one-column matrix.
    fn pressure(&mut self, points: &[Point]) -> Result<Array2<f64>>;
}

/// Wraps a closure as a [`PressureField`].
pub struct FnField<F> {
    f: F,
}

impl<F> FnField<F>
where
    F: FnMut(&[Point]) -> Result<Array2<f64>>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> PressureField for FnField<F>
where
    F: FnMut(&[Point]) -> Result<Array2<f64>>,
{
    fn pressure(&mut self, points: &[Point]) -> Result<Array2<f64>> {
        (self.f)(points)
    }
}

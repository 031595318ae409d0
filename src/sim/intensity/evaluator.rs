use std::fmt;

use anyhow::anyhow;
use ndarray::Axis;

use super::batches::{batches, num_batches};
use super::config::BatchConfig;
use super::error::{Result, ScanError};
use super::sample::{IntensityResult, LensCorrection, SamplePoint};
use crate::Point;
use crate::sim::field::PressureField;

/// Progress of a scan, reported once after each completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    /// Index of the completed batch (0-based).
    pub batch_index: usize,
    /// Total number of batches in the run.
    pub num_batches: usize,
    /// First node index of the completed batch.
    pub start: usize,
    /// One past the last node index of the completed batch.
    pub end: usize,
    /// Total number of nodes in the run.
    pub num_nodes: usize,
}

impl ScanProgress {
    /// Position of the batch start within the node list, in percent.
    pub fn percent(&self) -> f64 {
        if self.num_nodes == 0 {
            return 0.0;
        }
        self.start as f64 / self.num_nodes as f64 * 100.0
    }
}

impl fmt::Display for ScanProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.percent())
    }
}

trait ProgressReporter {
    fn report(&mut self, progress: &ScanProgress);
}

struct NoProgress;
impl ProgressReporter for NoProgress {
    fn report(&mut self, _progress: &ScanProgress) {}
}

struct FnProgress<F> {
    f: F,
}
impl<F> ProgressReporter for FnProgress<F>
where
    F: FnMut(&ScanProgress),
{
    fn report(&mut self, progress: &ScanProgress) {
        (self.f)(progress);
    }
}

/// Computes `Σ p²` of the pressure waveform at every sample point.
///
/// See [`evaluate_with_progress`] for the batching rules.
pub fn evaluate<F>(
    points: &[SamplePoint],
    correction: LensCorrection,
    config: &BatchConfig,
    field: &mut F,
) -> Result<IntensityResult>
where
    F: PressureField + ?Sized,
{
    run(points, correction, config, field, NoProgress)
}

/// Computes `Σ p²` of the pressure waveform at every sample point, reporting
/// progress after each batch.
///
/// - The lens correction is added to every point once, before the first batch.
/// - `config.threads` is forwarded to the field once, before the first batch.
/// - The field is called once per batch of `config.step_size` consecutive points
///   (the last batch holds the remainder).
/// - The first failing batch aborts the run; no partial result is returned.
pub fn evaluate_with_progress<F, R>(
    points: &[SamplePoint],
    correction: LensCorrection,
    config: &BatchConfig,
    field: &mut F,
    report: R,
) -> Result<IntensityResult>
where
    F: PressureField + ?Sized,
    R: FnMut(&ScanProgress),
{
    run(points, correction, config, field, FnProgress { f: report })
}

fn run<F, R>(
    points: &[SamplePoint],
    correction: LensCorrection,
    config: &BatchConfig,
    field: &mut F,
    mut reporter: R,
) -> Result<IntensityResult>
where
    F: PressureField + ?Sized,
    R: ProgressReporter,
{
    if points.is_empty() {
        return Err(ScanError::InvalidConfig(
            "no sample points to evaluate".to_string(),
        ));
    }
    config.validate()?;

    let num_nodes = points.len();
    let total_batches = num_batches(num_nodes, config.step_size);
    log::info!(
        "Evaluating field intensity at {num_nodes} nodes in {total_batches} batches \
         (step size {}, {} threads)",
        config.step_size,
        config.threads
    );

    field.set_threads(config.threads).map_err(|e| {
        ScanError::InvalidConfig(format!(
            "field rejected thread count {}: {e:#}",
            config.threads
        ))
    })?;

    let corrected: Vec<Point> = points
        .iter()
        .map(|p| correction.apply(p.position))
        .collect();
    let mut result = IntensityResult::preallocated(points);

    for (batch_index, range) in batches(num_nodes, config.step_size).enumerate() {
        let (start, end) = (range.start, range.end);
        let failed = move |source: anyhow::Error| ScanError::EvaluationFailed {
            batch: batch_index,
            start,
            end,
            source,
        };

        let pressure = field.pressure(&corrected[range.clone()]).map_err(failed)?;
        if pressure.nrows() != range.len() {
            return Err(failed(anyhow!(
                "field returned {} waveforms for {} points",
                pressure.nrows(),
                range.len()
            )));
        }

        for (out, waveform) in result.intensity[range]
            .iter_mut()
            .zip(pressure.axis_iter(Axis(0)))
        {
            *out = waveform.dot(&waveform);
        }

        let progress = ScanProgress {
            batch_index,
            num_batches: total_batches,
            start,
            end,
            num_nodes,
        };
        log::debug!(
            "Batch {}/{} done (nodes {start}..{end}, {progress})",
            batch_index + 1,
            total_batches
        );
        reporter.report(&progress);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector;
    use crate::sim::field::FnField;
    use ndarray::Array2;
    use std::ops::Range;

    fn line_of_points(n: usize) -> Vec<SamplePoint> {
        (0..n)
            .map(|i| SamplePoint::new(i as u64 + 1, Point::new(0.0, 0.0, i as f64)))
            .collect()
    }

    /// Field returning the z-coordinate as a one-sample waveform.
    fn z_field(pts: &[Point]) -> anyhow::Result<Array2<f64>> {
        Ok(Array2::from_shape_fn((pts.len(), 1), |(i, _)| pts[i].z))
    }

    #[test]
    fn test_end_to_end_squares() {
        let points = line_of_points(5);
        let correction = LensCorrection::new(Vector::new(0.0, 0.0, 1.0));
        let config = BatchConfig::new().with_step_size(2);

        let mut seen: Vec<Range<usize>> = Vec::new();
        let mut offset = 0;
        let mut field = FnField::new(|pts: &[Point]| {
            seen.push(offset..offset + pts.len());
            offset += pts.len();
            z_field(pts)
        });

        let result = evaluate(&points, correction, &config, &mut field).unwrap();
        assert_eq!(result.len(), 5);
        let expected = [1.0, 4.0, 9.0, 16.0, 25.0];
        for (v, e) in result.values().iter().zip(expected.iter()) {
            assert!((v - e).abs() < 1e-10);
        }
        assert_eq!(result.node_ids, vec![1, 2, 3, 4, 5]);
        drop(field);
        assert_eq!(seen, vec![0..2, 2..4, 4..5]);
    }

    #[test]
    fn test_waveform_rows_are_summed() {
        let points = line_of_points(3);
        let config = BatchConfig::new().with_step_size(2);
        // Waveform [z, 2z, -z] -> intensity 6 z^2
        let mut field = FnField::new(|pts: &[Point]| {
            Ok(Array2::from_shape_fn((pts.len(), 3), |(i, k)| {
                let z = pts[i].z;
                [z, 2.0 * z, -z][k]
            }))
        });
        let result = evaluate(&points, LensCorrection::none(), &config, &mut field).unwrap();
        assert!((result.intensity[0] - 0.0).abs() < 1e-10);
        assert!((result.intensity[1] - 6.0).abs() < 1e-10);
        assert!((result.intensity[2] - 24.0).abs() < 1e-10);
    }

    #[test]
    fn test_progress_once_per_batch() {
        let points = line_of_points(5);
        let config = BatchConfig::new().with_step_size(2);
        let mut field = FnField::new(z_field);

        let mut reports: Vec<ScanProgress> = Vec::new();
        evaluate_with_progress(&points, LensCorrection::none(), &config, &mut field, |p| {
            reports.push(*p)
        })
        .unwrap();

        assert_eq!(reports.len(), 3);
        let starts: Vec<usize> = reports.iter().map(|p| p.start).collect();
        assert_eq!(starts, vec![0, 2, 4]);
        assert!(reports.iter().all(|p| p.num_batches == 3 && p.num_nodes == 5));
        assert_eq!(reports[2].end, 5);
        assert_eq!(format!("{}", reports[0]), "0.0%");
        assert_eq!(format!("{}", reports[1]), "40.0%");
        assert_eq!(format!("{}", reports[2]), "80.0%");
    }

    #[test]
    fn test_progress_percent_one_decimal() {
        let p = ScanProgress {
            batch_index: 1,
            num_batches: 8,
            start: 20000,
            end: 40000,
            num_nodes: 150000,
        };
        assert_eq!(format!("{p}"), "13.3%");
    }

    #[test]
    fn test_zero_step_size_makes_no_calls() {
        let points = line_of_points(4);
        let config = BatchConfig::new().with_step_size(0);
        let mut calls = 0;
        let mut field = FnField::new(|pts: &[Point]| {
            calls += 1;
            z_field(pts)
        });
        let res = evaluate(&points, LensCorrection::none(), &config, &mut field);
        assert!(matches!(res, Err(ScanError::InvalidConfig(_))));
        drop(field);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_empty_points_make_no_calls() {
        let config = BatchConfig::new();
        let mut calls = 0;
        let mut field = FnField::new(|pts: &[Point]| {
            calls += 1;
            z_field(pts)
        });
        let res = evaluate(&[], LensCorrection::none(), &config, &mut field);
        assert!(matches!(res, Err(ScanError::InvalidConfig(_))));
        drop(field);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_failure_stops_the_run() {
        let points = line_of_points(16);
        let config = BatchConfig::new().with_step_size(2);
        let mut calls = 0;
        let mut field = FnField::new(|pts: &[Point]| {
            calls += 1;
            if calls == 3 {
                return Err(anyhow!("field engine crashed"));
            }
            z_field(pts)
        });
        let mut reports = 0;
        let res = evaluate_with_progress(
            &points,
            LensCorrection::none(),
            &config,
            &mut field,
            |_| reports += 1,
        );
        match res {
            Err(ScanError::EvaluationFailed {
                batch, start, end, ..
            }) => {
                assert_eq!(batch, 2);
                assert_eq!((start, end), (4, 6));
            }
            other => panic!("expected EvaluationFailed, got {other:?}"),
        }
        drop(field);
        assert_eq!(calls, 3);
        assert_eq!(reports, 2);
    }

    #[test]
    fn test_failure_cause_reported_once() {
        let points = line_of_points(4);
        let config = BatchConfig::new().with_step_size(2);
        let mut field =
            FnField::new(|_pts: &[Point]| -> anyhow::Result<Array2<f64>> {
                Err(anyhow!("transducer model diverged"))
            });
        let err = evaluate(&points, LensCorrection::none(), &config, &mut field).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Field evaluation failed for batch 0 (nodes 0..2)"
        );
        let chain = format!("{:#}", anyhow::Error::new(err).context("Intensity scan failed"));
        assert_eq!(chain.matches("transducer model diverged").count(), 1);
    }

    #[test]
    fn test_row_count_mismatch_is_evaluation_failure() {
        let points = line_of_points(4);
        let config = BatchConfig::new().with_step_size(4);
        let mut field = FnField::new(|_pts: &[Point]| Ok(Array2::zeros((1, 1))));
        let res = evaluate(&points, LensCorrection::none(), &config, &mut field);
        assert!(matches!(
            res,
            Err(ScanError::EvaluationFailed { batch: 0, .. })
        ));
    }

    struct ThreadRecorder {
        thread_calls: Vec<usize>,
        batches: usize,
    }

    impl PressureField for ThreadRecorder {
        fn set_threads(&mut self, threads: usize) -> anyhow::Result<()> {
            assert_eq!(self.batches, 0, "threads must be set before any batch");
            self.thread_calls.push(threads);
            Ok(())
        }

        fn pressure(&mut self, points: &[Point]) -> anyhow::Result<Array2<f64>> {
            self.batches += 1;
            z_field(points)
        }
    }

    #[test]
    fn test_threads_set_once_before_batches() {
        let points = line_of_points(10);
        let config = BatchConfig::new().with_step_size(3).with_threads(8);
        let mut field = ThreadRecorder {
            thread_calls: Vec::new(),
            batches: 0,
        };
        evaluate(&points, LensCorrection::none(), &config, &mut field).unwrap();
        assert_eq!(field.thread_calls, vec![8]);
        assert_eq!(field.batches, 4);
    }

    struct RejectThreads;

    impl PressureField for RejectThreads {
        fn set_threads(&mut self, _threads: usize) -> anyhow::Result<()> {
            Err(anyhow!("unsupported"))
        }

        fn pressure(&mut self, _points: &[Point]) -> anyhow::Result<Array2<f64>> {
            panic!("must not be called");
        }
    }

    #[test]
    fn test_rejected_thread_hint_is_invalid_config() {
        let points = line_of_points(2);
        let res = evaluate(
            &points,
            LensCorrection::none(),
            &BatchConfig::new(),
            &mut RejectThreads,
        );
        assert!(matches!(res, Err(ScanError::InvalidConfig(_))));
    }

    #[test]
    fn test_works_with_dyn_field() {
        let points = line_of_points(3);
        let mut field = FnField::new(z_field);
        let dyn_field: &mut dyn PressureField = &mut field;
        let result = evaluate(&points, LensCorrection::none(), &BatchConfig::new(), dyn_field)
            .unwrap();
        assert!((result.intensity[2] - 4.0).abs() < 1e-10);
    }
}

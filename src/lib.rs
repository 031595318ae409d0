pub mod config;
pub mod geom;
pub mod io;
pub mod sim;

// Prelude
pub use config::ScanConfig;
pub use geom::point::Point;
pub use geom::vector::Vector;
pub use sim::field::{FnField, PointSourceArray, PressureField, PulseParams};
pub use sim::intensity::{
    BatchConfig, IntensityResult, LensCorrection, SamplePoint, ScanError, ScanProgress, evaluate,
    evaluate_with_progress,
};

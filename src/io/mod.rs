//! File I/O for scan inputs and results.
//!
//! This module provides functions for reading node lists and run
//! configurations, and for writing intensity results.

pub mod intensity;
pub mod nodes;
pub mod scan_config;

pub use intensity::{read_intensity, write_intensity};
pub use nodes::{parse_nodes, read_nodes};
pub use scan_config::{read_scan_config, write_scan_config};

//! Scan configuration files (JSON).

use crate::config::ScanConfig;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Reads a scan configuration. Missing keys take their default values.
pub fn read_scan_config(path: &Path) -> Result<ScanConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize scan config from: {}", path.display()))
}

/// Writes a scan configuration, e.g. to produce a template to edit.
pub fn write_scan_config(path: &Path, config: &ScanConfig) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, config)
        .with_context(|| format!("Failed to serialize scan config to: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

//! Intensity result I/O (pretty-printed JSON).

use crate::sim::intensity::IntensityResult;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes an intensity result to a JSON file.
pub fn write_intensity(path: &Path, result: &IntensityResult) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, result)
        .with_context(|| format!("Failed to serialize intensity to: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}

/// Reads an intensity result from a JSON file.
pub fn read_intensity(path: &Path) -> Result<IntensityResult> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let reader = BufReader::new(file);

    let result: IntensityResult = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to deserialize intensity from: {}", path.display()))?;

    Ok(result)
}

//! Node list reader.
//!
//! Node files follow the LS-DYNA `*NODE` card layout: one `id,x,y,z` record per
//! line. Keyword lines (`*...`), comment lines (`$...`) and blank lines are
//! skipped. Fields may be separated by commas or whitespace.

use crate::Point;
use crate::sim::intensity::SamplePoint;
use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::path::Path;

/// Reads sample points from a node file.
///
/// # Example
/// ```no_run
/// use fieldscan::io::read_nodes;
/// use std::path::Path;
///
/// let nodes = read_nodes(Path::new("nodes.dyn")).unwrap();
/// println!("Loaded {} nodes", nodes.len());
/// ```
pub fn read_nodes(path: &Path) -> Result<Vec<SamplePoint>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    parse_nodes(&text).with_context(|| format!("Failed to parse nodes from: {}", path.display()))
}

/// Parses sample points from node file contents.
pub fn parse_nodes(text: &str) -> Result<Vec<SamplePoint>> {
    let mut nodes = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('*') || line.starts_with('$') {
            continue;
        }
        let node = parse_record(line).with_context(|| format!("Line {}: '{}'", line_no + 1, line))?;
        nodes.push(node);
    }

    if nodes.is_empty() {
        bail!("No node records found");
    }
    Ok(nodes)
}

fn parse_record(line: &str) -> Result<SamplePoint> {
    let fields: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();

    // LS-DYNA allows trailing translational/rotational constraint columns
    if fields.len() < 4 {
        bail!("Expected 'id,x,y,z', got {} fields", fields.len());
    }
    if fields.len() > 4 {
        log::warn!("Ignoring {} extra fields in node record", fields.len() - 4);
    }

    let id: u64 = fields[0]
        .parse()
        .map_err(|e| anyhow!("Invalid node id '{}': {e}", fields[0]))?;
    let mut coords = [0.0; 3];
    for (c, s) in coords.iter_mut().zip(&fields[1..4]) {
        *c = s
            .parse()
            .map_err(|e| anyhow!("Invalid coordinate '{s}': {e}"))?;
    }

    Ok(SamplePoint::new(id, Point::new(coords[0], coords[1], coords[2])))
}

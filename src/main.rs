use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fieldscan::io::{read_nodes, read_scan_config, write_intensity};
use fieldscan::{ScanConfig, evaluate_with_progress};
use log::info;

/// Computes acoustic field intensity at FEM mesh nodes.
#[derive(Parser)]
#[command(name = "fieldscan", version)]
struct Args {
    /// Node file (LS-DYNA *NODE records: id,x,y,z)
    #[arg(long)]
    nodes: PathBuf,

    /// Scan configuration (JSON); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file for the intensity result (JSON)
    #[arg(long, default_value = "intensity.json")]
    output: PathBuf,

    /// Nodes per field evaluation call (overrides the config file)
    #[arg(long)]
    step_size: Option<usize>,

    /// Worker threads for field evaluation (overrides the config file)
    #[arg(long)]
    threads: Option<usize>,

    /// Scale the result so that the peak intensity is 1
    #[arg(long)]
    normalize: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => {
            info!("Loading scan configuration from: {}", path.display());
            read_scan_config(path)?
        }
        None => {
            info!("No configuration file specified, using defaults");
            ScanConfig::new()
        }
    };
    if let Some(step_size) = args.step_size {
        config.batch.step_size = step_size;
    }
    if let Some(threads) = args.threads {
        config.batch.threads = threads;
    }

    let nodes = read_nodes(&args.nodes)?;
    info!("Loaded {} nodes from {}", nodes.len(), args.nodes.display());
    info!(
        "Lens correction: {:.4}, transducer elements: {}",
        config.lens_correction,
        config.elements.len()
    );

    let mut field = config.build_field()?;
    let result = evaluate_with_progress(
        &nodes,
        config.correction(),
        &config.batch,
        &mut field,
        |progress| info!("Field intensity progress: {progress}"),
    )
    .context("Intensity scan failed")?;

    let result = if args.normalize {
        result.normalized()
    } else {
        result
    };
    if let Some(peak) = result.max() {
        info!("Peak intensity: {peak:.6e}");
    }

    write_intensity(&args.output, &result)?;
    info!("Intensity written to: {}", args.output.display());
    Ok(())
}

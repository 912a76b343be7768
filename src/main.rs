//! Matrix pipeline CLI: read a work list, derive the matrix artifacts
//! through the staged worker pools, write the report.

use anyhow::Result;
use clap::Parser;
use log::info;
use matrix_pipeline::PipelineBuilder;
use std::path::PathBuf;

/// Derive product, column-sum and total-sum artifacts for each matrix
/// file named in the work list.
#[derive(Parser)]
#[command(name = "matrix-pipeline", version)]
struct Cli {
    /// Work list: one matrix file path per line.
    #[arg(value_name = "LIST", default_value = "input/entrada.in")]
    list: PathBuf,

    /// Report file, one record per processed entry.
    #[arg(value_name = "REPORT", default_value = "output/saida.out")]
    report: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let pipeline = PipelineBuilder::new().build()?;
    let summary = pipeline.run(&cli.list, &cli.report)?;
    info!(
        "done: {} records written ({} loaded, {} skipped)",
        summary.records_written, summary.items_loaded, summary.items_skipped
    );
    Ok(())
}

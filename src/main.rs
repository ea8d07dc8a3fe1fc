use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sofscan::batch::{collect_files, scan_files};
use sofscan::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let options = cli.scan_options();
    options.validate().context("Invalid scan options")?;

    let files = collect_files(&cli.paths).context("Failed to collect input files")?;
    if files.is_empty() {
        tracing::warn!("No files found under the given paths");
    }

    let report = scan_files(&files, &options).context("Batch scan failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{}", json);
    } else {
        print!("{}", report.render());
    }

    Ok(())
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

//! Command-line arguments using clap

use crate::options::{DEFAULT_CHUNK_SIZE, DEFAULT_CONCURRENCY, MAX_SEGMENTS, ScanOptions};
use clap::Parser;
use std::path::PathBuf;

/// Print the pixel size of JPEG files without decoding them.
///
/// Only the bytes up to the first Start-Of-Frame marker of each file are
/// read. Directories are walked recursively.
#[derive(Parser, Debug)]
#[command(name = "sofscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Read JPEG dimensions from the frame header", long_about = None)]
pub struct Cli {
    /// Files or directories to scan
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Read window size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// Give up on a file after this many segments
    #[arg(long, default_value_t = MAX_SEGMENTS)]
    pub max_segments: usize,

    /// Number of files scanned in parallel
    #[arg(short = 'j', long, default_value_t = DEFAULT_CONCURRENCY)]
    pub jobs: usize,

    /// Memory-map files instead of reading them
    #[arg(long)]
    pub mmap: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,
}

impl Cli {
    pub fn scan_options(&self) -> ScanOptions {
        let options = ScanOptions::new()
            .with_chunk_size(self.chunk_size)
            .with_max_segments(self.max_segments)
            .with_concurrency(self.jobs);

        if self.mmap { options.mmap() } else { options }
    }

    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

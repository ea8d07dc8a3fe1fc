//! Many-file driver: collects files and scans them in parallel.
//!
//! Every file gets its own source and reader; nothing is shared between
//! scans, so the fan-out is a plain bounded `rayon` pool.

use crate::error::{Result, ScanError};
use crate::formats::jpeg::{ScanOutcome, scan_path};
use crate::options::ScanOptions;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileOutcome {
    Scanned(ScanOutcome),
    /// The file could not be opened or read.
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// `<name>: <width>x<height>`, or `<name>: error` for anything else.
    pub fn line(&self) -> String {
        match &self.outcome {
            FileOutcome::Scanned(ScanOutcome::Dimensions(dims)) => {
                format!("{}: {}", self.name(), dims)
            }
            _ => format!("{}: error", self.name()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
    pub elapsed_ms: f64,
}

impl BatchReport {
    pub fn render(&self) -> String {
        let mut out = format!("time: {:.0}ms\n", self.elapsed_ms);
        for file in &self.files {
            let _ = writeln!(out, "{}", file.line());
        }
        out
    }

    pub fn succeeded(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(&f.outcome, FileOutcome::Scanned(o) if o.is_dimensions()))
            .count()
    }
}

/// Expands directories into the regular files below them.
///
/// Plain file arguments are kept as-is. Symlinks are not followed and
/// entries inside a directory come out in file-name order. A root that cannot
/// be read is an error; an unreadable entry below it is logged and skipped.
pub fn collect_files(roots: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() > 0 => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}

/// Scans every path on a pool of `options.concurrency` threads.
///
/// A file that cannot be read is reported as [`FileOutcome::Failed`] and does
/// not stop the batch. Reader misuse aborts it, since it would hit every file
/// the same way.
pub fn scan_files(paths: &[PathBuf], options: &ScanOptions) -> Result<BatchReport> {
    options.validate()?;

    let pool = ThreadPoolBuilder::new()
        .num_threads(options.concurrency)
        .thread_name(|i| format!("sofscan-{}", i))
        .build()?;

    info!(
        files = paths.len(),
        workers = options.concurrency,
        chunk_size = options.chunk_size,
        "Starting batch scan"
    );

    let start = Instant::now();
    let files = pool.install(|| {
        paths
            .par_iter()
            .map(|path| scan_one(path, options))
            .collect::<Result<Vec<_>>>()
    })?;
    let elapsed = start.elapsed();

    let report = BatchReport {
        files,
        elapsed_ms: elapsed.as_secs_f64() * 1000.0,
    };

    info!(
        "Batch complete: {} of {} files measured in {:.2}s",
        report.succeeded(),
        report.files.len(),
        elapsed.as_secs_f64()
    );

    Ok(report)
}

fn scan_one(path: &Path, options: &ScanOptions) -> Result<FileReport> {
    let outcome = match scan_path(path, options) {
        Ok(outcome) => FileOutcome::Scanned(outcome),
        Err(e) if e.is_internal() => return Err(e),
        Err(e) => {
            warn!("Failed to scan {}: {}", path.display(), e);
            FileOutcome::error(&e)
        }
    };

    Ok(FileReport {
        path: path.to_path_buf(),
        outcome,
    })
}

impl From<ScanOutcome> for FileOutcome {
    fn from(outcome: ScanOutcome) -> Self {
        FileOutcome::Scanned(outcome)
    }
}

impl FileOutcome {
    pub fn error(e: &ScanError) -> Self {
        FileOutcome::Failed {
            error: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::jpeg::SofDimensions;

    #[test]
    fn test_report_lines() {
        let report = BatchReport {
            files: vec![
                FileReport {
                    path: PathBuf::from("photos/a.jpg"),
                    outcome: ScanOutcome::Dimensions(SofDimensions::new(640, 480)).into(),
                },
                FileReport {
                    path: PathBuf::from("photos/b.png"),
                    outcome: ScanOutcome::NotAJpeg.into(),
                },
            ],
            elapsed_ms: 12.4,
        };

        assert_eq!(report.render(), "time: 12ms\na.jpg: 640x480\nb.png: error\n");
        assert_eq!(report.succeeded(), 1);
    }

    #[test]
    fn test_failed_outcome_serializes_error() {
        let e = ScanError::EmptySource("x.jpg".to_string());
        let json = serde_json::to_string(&FileOutcome::error(&e)).unwrap();
        assert_eq!(json, r#"{"error":"Cannot map empty source: x.jpg"}"#);
    }

    #[test]
    fn test_scanned_outcome_serializes_flat() {
        let outcome: FileOutcome = ScanOutcome::Dimensions(SofDimensions::new(3, 4)).into();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "dimensions");
        assert_eq!(json["width"], 3);
        assert_eq!(json["height"], 4);
    }
}

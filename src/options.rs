//! Scan options

use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};

/// Size of the cached read window in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Number of marker segments walked before giving up on a file.
pub const MAX_SEGMENTS: usize = 1000;

/// Number of files scanned at the same time by [`crate::batch::scan_files`].
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Smallest window that can hold the largest fixed read the scanner issues.
pub const MIN_CHUNK_SIZE: usize = 8;

/// Largest window a scan may allocate.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Options for scanning one or more byte sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Window size for the buffered reader (affects memory usage per scan)
    pub chunk_size: usize,
    /// Segment guard for files that never reach a frame marker
    pub max_segments: usize,
    /// Maximum number of scans running in parallel
    pub concurrency: usize,
    /// Memory-map files instead of reading them through positioned reads
    pub use_mmap: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_segments: MAX_SEGMENTS,
            concurrency: DEFAULT_CONCURRENCY,
            use_mmap: false,
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the window size
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the segment guard
    pub fn with_max_segments(mut self, max: usize) -> Self {
        self.max_segments = max;
        self
    }

    /// Sets the number of parallel scans
    pub fn with_concurrency(mut self, jobs: usize) -> Self {
        self.concurrency = jobs;
        self
    }

    /// Reads files through a memory map
    pub fn mmap(mut self) -> Self {
        self.use_mmap = true;
        self
    }

    /// Rejects option sets the scanner cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size < MIN_CHUNK_SIZE {
            return Err(ScanError::InvalidOptions(format!(
                "chunk size {} is below the minimum of {} bytes",
                self.chunk_size, MIN_CHUNK_SIZE
            )));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ScanError::InvalidOptions(format!(
                "chunk size {} is above the maximum of {} bytes",
                self.chunk_size, MAX_CHUNK_SIZE
            )));
        }
        if self.max_segments == 0 {
            return Err(ScanError::InvalidOptions(
                "max segments must be at least 1".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(ScanError::InvalidOptions(
                "concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

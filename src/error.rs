use std::io;
use thiserror::Error;

/// Errors raised while reading a byte source.
///
/// Shape problems in the image itself (missing SOI, bad marker byte, too many
/// segments) are not errors: they are reported through
/// [`ScanOutcome`](crate::formats::jpeg::ScanOutcome).
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Read of {requested} bytes does not fit in a {chunk_size} byte window")]
    RequestTooLarge { requested: usize, chunk_size: usize },

    #[error("Invalid range: end {end} is before start {start}")]
    InvalidRange { start: usize, end: usize },

    #[error("Read error at offset {offset}: {source}")]
    SourceRead {
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Cannot map empty source: {0}")]
    EmptySource(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ScanError>;

impl ScanError {
    /// True for errors that indicate a bug in the caller rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ScanError::RequestTooLarge { .. } | ScanError::InvalidRange { .. }
        )
    }
}

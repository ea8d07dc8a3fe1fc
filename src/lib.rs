pub mod batch;
pub mod cli;
pub mod error;
pub mod formats;
pub mod io;
pub mod options;
pub mod source;

pub use error::{Result, ScanError};
pub use formats::jpeg::{ScanOutcome, SofDimensions, scan, scan_bytes, scan_path, scan_with};
pub use io::WindowedReader;
pub use options::ScanOptions;
pub use source::{ByteSource, FileSource, MmapSource, SliceSource};

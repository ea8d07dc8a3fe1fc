pub mod jpeg;

pub use jpeg::{ScanOutcome, SofDimensions, scan, scan_bytes, scan_path, scan_with};

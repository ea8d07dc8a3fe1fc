#![no_main]

use libfuzzer_sys::fuzz_target;
use sofscan::formats::jpeg::scan_with;
use sofscan::{ScanOptions, SliceSource};

fuzz_target!(|data: &[u8]| {
    // Small window so the fuzzer exercises refills as well.
    let options = ScanOptions::new().with_chunk_size(64);
    let outcome = scan_with(SliceSource::new(data), &options);
    assert!(outcome.is_ok());
});

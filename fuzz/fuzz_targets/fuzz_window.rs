#![no_main]

use libfuzzer_sys::fuzz_target;
use sofscan::{SliceSource, WindowedReader};

fuzz_target!(|input: (Vec<u8>, Vec<(u8, u8, u16)>)| {
    let (data, ops) = input;
    let mut reader = WindowedReader::new(SliceSource::new(&data), 32);
    let mut cursor = 0usize;

    for (start, len, step) in ops {
        let (start, len) = (start as usize % 32, len as usize % 31);
        let bytes = reader.read_range(start, start + len).unwrap();

        let from = (cursor + start).min(data.len());
        let to = (cursor + start + len).min(data.len());
        assert_eq!(bytes, &data[from..to]);

        reader.advance(u64::from(step));
        cursor += step as usize;
    }
});

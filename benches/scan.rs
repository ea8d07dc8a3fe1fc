use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sofscan::formats::jpeg::scan_with;
use sofscan::{ScanOptions, SliceSource};

/// A JPEG whose frame header sits behind `app_segments` 4 KiB APP segments.
fn synthetic_jpeg(app_segments: usize) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    for i in 0..app_segments {
        data.extend_from_slice(&[0xFF, 0xE0 + (i % 16) as u8, 0x10, 0x02]);
        data.extend_from_slice(&[0u8; 0x1000]);
    }
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x0F, 0xA0, 0x17, 0x70]);
    data.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
    data.extend_from_slice(&vec![0x5A; 1 << 20]);
    data
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for segments in [0usize, 16, 256] {
        let data = synthetic_jpeg(segments);
        group.throughput(Throughput::Elements(1));

        for chunk_size in [4 * 1024, 64 * 1024] {
            let options = ScanOptions::new().with_chunk_size(chunk_size);
            group.bench_with_input(
                BenchmarkId::new(format!("chunk_{}", chunk_size), segments),
                &data,
                |b, data| b.iter(|| scan_with(SliceSource::new(black_box(data)), &options)),
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);

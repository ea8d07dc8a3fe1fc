use crate::error::Result;
use crate::io::WindowedReader;
use crate::options::ScanOptions;
use crate::source::{ByteSource, SliceSource, open_path};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::{debug, trace};

pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];
pub const MARKER_PREFIX: u8 = 0xFF;

/// Start-Of-Frame marker family. The whole range is matched, including the
/// table markers that share it.
pub const SOF_MARKERS: RangeInclusive<u8> = 0xC0..=0xCF;

const SEGMENT_HEADER_LEN: usize = 4;
const FRAME_PREFIX_LEN: usize = 5;

#[inline]
pub fn is_sof_marker(marker: u8) -> bool {
    SOF_MARKERS.contains(&marker)
}

/// Image size as declared by the frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SofDimensions {
    pub width: u16,
    pub height: u16,
}

impl SofDimensions {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for SofDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Result of walking a JPEG up to its first frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Dimensions(SofDimensions),
    /// The source does not start with `FF D8`.
    NotAJpeg,
    /// A segment did not start with `FF`, declared a zero length, or the
    /// source ended inside a header.
    Malformed,
    /// The segment guard ran out before a frame marker showed up.
    TooManySegments,
}

impl ScanOutcome {
    pub fn dimensions(&self) -> Option<SofDimensions> {
        match self {
            ScanOutcome::Dimensions(dims) => Some(*dims),
            _ => None,
        }
    }

    pub fn is_dimensions(&self) -> bool {
        matches!(self, ScanOutcome::Dimensions(_))
    }
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanOutcome::Dimensions(dims) => write!(f, "{}", dims),
            ScanOutcome::NotAJpeg => write!(f, "not a jpeg"),
            ScanOutcome::Malformed => write!(f, "malformed"),
            ScanOutcome::TooManySegments => write!(f, "too many segments"),
        }
    }
}

/// Reads the image size of a JPEG with the default window and segment guard.
pub fn scan<S: ByteSource>(source: S) -> Result<ScanOutcome> {
    scan_with(source, &ScanOptions::default())
}

/// Reads the image size of a JPEG, touching only the bytes up to the first
/// frame header.
///
/// Errors are reserved for source failures and reader misuse; every shape
/// problem of the data itself is an [`ScanOutcome`].
pub fn scan_with<S: ByteSource>(source: S, options: &ScanOptions) -> Result<ScanOutcome> {
    let mut reader = WindowedReader::with_options(source, options);
    let outcome = walk_segments(&mut reader, options.max_segments)?;

    debug!(
        %outcome,
        position = reader.position(),
        chunk_size = reader.chunk_size(),
        fetches = reader.fetch_count(),
        "scan finished"
    );

    Ok(outcome)
}

pub fn scan_bytes(data: &[u8]) -> Result<ScanOutcome> {
    scan(SliceSource::new(data))
}

/// Opens `path` (memory-mapped when the options ask for it) and scans it.
pub fn scan_path(path: impl AsRef<Path>, options: &ScanOptions) -> Result<ScanOutcome> {
    let source = open_path(path.as_ref(), options.use_mmap)?;
    scan_with(source, options)
}

fn walk_segments<S: ByteSource>(
    reader: &mut WindowedReader<S>,
    max_segments: usize,
) -> Result<ScanOutcome> {
    if *reader.read_range(0, 2)? != JPEG_SOI {
        return Ok(ScanOutcome::NotAJpeg);
    }
    reader.advance(2);

    for _ in 0..max_segments {
        let header: [u8; SEGMENT_HEADER_LEN] =
            match reader.read_range(0, SEGMENT_HEADER_LEN)?.try_into() {
                Ok(header) => header,
                Err(_) => {
                    debug!(offset = reader.position(), "source ended inside segment header");
                    return Ok(ScanOutcome::Malformed);
                }
            };

        if header[0] != MARKER_PREFIX {
            debug!(
                offset = reader.position(),
                byte = header[0],
                "segment does not start with a marker"
            );
            return Ok(ScanOutcome::Malformed);
        }

        let marker = header[1];
        let length = u16::from_be_bytes([header[2], header[3]]);

        if is_sof_marker(marker) {
            reader.advance(SEGMENT_HEADER_LEN as u64);
            return read_frame_header(reader);
        }

        if length == 0 {
            debug!(offset = reader.position(), marker, "zero segment length");
            return Ok(ScanOutcome::Malformed);
        }

        trace!(offset = reader.position(), marker, length, "skipping segment");
        reader.advance(u64::from(length) + 2);
    }

    Ok(ScanOutcome::TooManySegments)
}

// Frame header: precision (1), height (2), width (2), all big-endian.
fn read_frame_header<S: ByteSource>(reader: &mut WindowedReader<S>) -> Result<ScanOutcome> {
    let frame: [u8; FRAME_PREFIX_LEN] = match reader.read_range(0, FRAME_PREFIX_LEN)?.try_into() {
        Ok(frame) => frame,
        Err(_) => {
            debug!(offset = reader.position(), "source ended inside frame header");
            return Ok(ScanOutcome::Malformed);
        }
    };

    let height = u16::from_be_bytes([frame[1], frame[2]]);
    let width = u16::from_be_bytes([frame[3], frame[4]]);

    Ok(ScanOutcome::Dimensions(SofDimensions { width, height }))
}

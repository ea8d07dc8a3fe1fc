//! Forward-scanning buffered reader over a [`ByteSource`].
//!
//! The reader keeps one contiguous window of at most `chunk_size` bytes and
//! serves small relative reads out of it. A read that falls outside the
//! window replaces it with a fresh one starting at the requested offset, so a
//! forward scan costs roughly one source fetch per `chunk_size` bytes and
//! never holds more than one window in memory.

use crate::error::{Result, ScanError};
use crate::options::ScanOptions;
use crate::source::ByteSource;
use std::io;
use tracing::trace;

#[derive(Debug, Clone, Copy)]
struct Window {
    start: u64,
    len: usize,
}

pub struct WindowedReader<S> {
    source: S,
    chunk_size: usize,
    cursor: u64,
    buffer: Vec<u8>,
    window: Option<Window>,
    fetches: u64,
}

impl<S: ByteSource> WindowedReader<S> {
    pub fn new(source: S, chunk_size: usize) -> Self {
        Self {
            source,
            chunk_size,
            cursor: 0,
            buffer: Vec::new(),
            window: None,
            fetches: 0,
        }
    }

    pub fn with_options(source: S, options: &ScanOptions) -> Self {
        Self::new(source, options.chunk_size)
    }

    /// Absolute offset of the cursor in the source.
    #[inline]
    pub fn position(&self) -> u64 {
        self.cursor
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of windows fetched from the source so far.
    #[inline]
    pub fn fetch_count(&self) -> u64 {
        self.fetches
    }

    /// Moves the cursor `n` bytes forward.
    #[inline]
    pub fn advance(&mut self, n: u64) {
        self.cursor = self.cursor.saturating_add(n);
    }

    /// Returns source bytes `[cursor + start, cursor + end)`.
    ///
    /// The slice is shorter than requested (possibly empty) when the source
    /// ends inside the range. Requests of `chunk_size` bytes or more are
    /// rejected before any I/O, whatever the cache state.
    pub fn read_range(&mut self, start: usize, end: usize) -> Result<&[u8]> {
        if end < start {
            return Err(ScanError::InvalidRange { start, end });
        }
        let length = end - start;
        if length >= self.chunk_size {
            return Err(ScanError::RequestTooLarge {
                requested: length,
                chunk_size: self.chunk_size,
            });
        }

        let abs_start = self.cursor.saturating_add(start as u64);
        let abs_end = abs_start.saturating_add(length as u64);

        if let Some(window) = self.window {
            let window_end = window.start.saturating_add(self.chunk_size as u64);
            if abs_start >= window.start && abs_end <= window_end {
                let from = (abs_start - window.start) as usize;
                return Ok(self.slice_window(window, from, length));
            }
        }

        let window = self.fill(abs_start)?;
        Ok(self.slice_window(window, 0, length))
    }

    /// Gives the source back, dropping the window.
    pub fn into_inner(self) -> S {
        self.source
    }

    #[inline]
    fn slice_window(&self, window: Window, from: usize, length: usize) -> &[u8] {
        let from = from.min(window.len);
        let to = from.saturating_add(length).min(window.len);
        &self.buffer[from..to]
    }

    fn fill(&mut self, offset: u64) -> Result<Window> {
        self.window = None;

        let available = self.source.size().saturating_sub(offset);
        let want = usize::try_from(available).map_or(self.chunk_size, |a| a.min(self.chunk_size));

        // Grows toward `chunk_size` only as far as the source has bytes.
        if self.buffer.len() < want {
            self.buffer.resize(want, 0);
        }

        let mut filled = 0usize;
        while filled < want {
            let pos = offset.saturating_add(filled as u64);
            match self.source.read_at(pos, &mut self.buffer[filled..want]) {
                Ok(0) => break,
                Ok(n) => filled += n.min(want - filled),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(ScanError::SourceRead {
                        offset: pos,
                        source,
                    });
                }
            }
        }

        self.fetches += 1;
        trace!(offset, len = filled, fetches = self.fetches, "window refilled");

        let window = Window {
            start: offset,
            len: filled,
        };
        self.window = Some(window);
        Ok(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceSource;

    struct FailingSource;

    impl ByteSource for FailingSource {
        fn read_at(&mut self, _offset: u64, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device gone"))
        }

        fn size(&self) -> u64 {
            1024
        }
    }

    /// Hands out at most three bytes per call, like a pipe or a slow device.
    struct TrickleSource<'a>(&'a [u8]);

    impl ByteSource for TrickleSource<'_> {
        fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
            let start = offset as usize;
            if start >= self.0.len() {
                return Ok(0);
            }
            let len = buf.len().min(3).min(self.0.len() - start);
            buf[..len].copy_from_slice(&self.0[start..start + len]);
            Ok(len)
        }

        fn size(&self) -> u64 {
            self.0.len() as u64
        }
    }

    #[test]
    fn test_reads_are_relative_to_cursor() {
        let data: Vec<u8> = (0..32).collect();
        let mut reader = WindowedReader::new(SliceSource::new(&data), 16);

        assert_eq!(reader.read_range(0, 2).unwrap(), &[0, 1]);
        reader.advance(4);
        assert_eq!(reader.read_range(1, 3).unwrap(), &[5, 6]);
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.fetch_count(), 1);
    }

    #[test]
    fn test_refill_when_range_leaves_window() {
        let data: Vec<u8> = (0..64).collect();
        let mut reader = WindowedReader::new(SliceSource::new(&data), 16);

        reader.read_range(0, 4).unwrap();
        reader.advance(14);
        assert_eq!(reader.read_range(0, 4).unwrap(), &[14, 15, 16, 17]);
        assert_eq!(reader.fetch_count(), 2);
        assert_eq!(reader.read_range(2, 6).unwrap(), &[16, 17, 18, 19]);
        assert_eq!(reader.fetch_count(), 2);
    }

    #[test]
    fn test_range_ending_on_window_edge_is_cached() {
        let data: Vec<u8> = (0..64).collect();
        let mut reader = WindowedReader::new(SliceSource::new(&data), 16);

        reader.read_range(0, 1).unwrap();
        assert_eq!(reader.read_range(12, 16).unwrap(), &[12, 13, 14, 15]);
        assert_eq!(reader.fetch_count(), 1);
    }

    #[test]
    fn test_request_too_large() {
        let data = [0u8; 64];
        let mut reader = WindowedReader::new(SliceSource::new(&data), 16);

        let err = reader.read_range(0, 16).unwrap_err();
        assert!(matches!(
            err,
            ScanError::RequestTooLarge {
                requested: 16,
                chunk_size: 16
            }
        ));
        assert!(err.is_internal());
        assert_eq!(reader.fetch_count(), 0);
    }

    #[test]
    fn test_inverted_range() {
        let data = [0u8; 8];
        let mut reader = WindowedReader::new(SliceSource::new(&data), 16);
        assert!(matches!(
            reader.read_range(4, 2),
            Err(ScanError::InvalidRange { start: 4, end: 2 })
        ));
    }

    #[test]
    fn test_short_read_at_end_of_source() {
        let data = [1u8, 2, 3];
        let mut reader = WindowedReader::new(SliceSource::new(&data), 16);

        assert_eq!(reader.read_range(1, 5).unwrap(), &[2, 3]);
        reader.advance(10);
        assert!(reader.read_range(0, 4).unwrap().is_empty());
    }

    #[test]
    fn test_source_error_is_wrapped() {
        let mut reader = WindowedReader::new(FailingSource, 16);
        reader.advance(7);
        match reader.read_range(1, 3) {
            Err(ScanError::SourceRead { offset, .. }) => assert_eq!(offset, 8),
            other => panic!("expected SourceRead, got {:?}", other.map(|b| b.to_vec())),
        }
    }

    #[test]
    fn test_short_source_reads_fill_the_window() {
        let data: Vec<u8> = (0..40).collect();
        let mut reader = WindowedReader::new(TrickleSource(&data), 16);

        assert_eq!(reader.read_range(0, 2).unwrap(), &[0, 1]);
        assert_eq!(reader.read_range(10, 15).unwrap(), &[10, 11, 12, 13, 14]);
        assert_eq!(reader.fetch_count(), 1);
    }

    #[test]
    fn test_window_sized_to_short_source() {
        let data = [0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0xC8, 0x00, 0x64, 0x03];
        let mut reader = WindowedReader::new(SliceSource::new(&data), 1 << 46);

        assert_eq!(reader.read_range(8, 12).unwrap(), &[0xC8, 0x00, 0x64, 0x03]);
        assert_eq!(reader.chunk_size(), 1 << 46);
        assert_eq!(reader.buffer.len(), data.len());
    }

    #[test]
    fn test_into_inner_returns_source() {
        let data = [9u8; 4];
        let reader = WindowedReader::new(SliceSource::new(&data), 16);
        assert_eq!(reader.into_inner().size(), 4);
    }
}

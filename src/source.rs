//! Random-access byte sources the scanner can read from.
//!
//! A scan only ever asks a source for "the bytes at this absolute offset"; it
//! never seeks by itself and never reads the whole source. Anything that can
//! answer that question (a slice, a file, a memory map, a remote blob) can be
//! scanned.

use crate::error::{Result, ScanError};
use memmap2::Mmap;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// A readable, finite, randomly addressable byte sequence.
///
/// # Example
///
/// ```ignore
/// struct Blob { /* ... */ }
///
/// impl ByteSource for Blob {
///     fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
///         // Copy bytes [offset, offset + buf.len()) into buf
///     }
///
///     fn size(&self) -> u64 {
///         // Return total size in bytes
///     }
/// }
/// ```
pub trait ByteSource {
    /// Reads bytes starting at `offset` into `buf`.
    ///
    /// Returns the number of bytes copied, which is less than `buf.len()`
    /// when the end of the source is reached and `0` for offsets at or past
    /// the end.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Returns the total size of the source in bytes.
    fn size(&self) -> u64;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

#[inline]
fn copy_from(data: &[u8], offset: u64, buf: &mut [u8]) -> usize {
    let Ok(start) = usize::try_from(offset) else {
        return 0;
    };
    if start >= data.len() {
        return 0;
    }
    let len = buf.len().min(data.len() - start);
    buf[..len].copy_from_slice(&data[start..start + len]);
    len
}

/// An in-memory source over a borrowed byte slice.
#[derive(Debug, Clone, Copy)]
pub struct SliceSource<'a> {
    data: &'a [u8],
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        Ok(copy_from(self.data, offset, buf))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A read-only source backed by an open file.
///
/// Only opens files in read-only mode. Reads are positioned: every call seeks
/// to the requested offset first, so the file cursor left behind by a
/// previous read never matters.
pub struct FileSource {
    file: File,
    size: u64,
}

impl FileSource {
    /// Opens `path` for reading.
    ///
    /// Fails if the file does not exist, permission is denied or its size
    /// cannot be determined.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(false)
            .open(path.as_ref())?;
        Self::new(file)
    }

    /// Wraps an already open file.
    pub fn new(mut file: File) -> Result<Self> {
        #[cfg(target_os = "linux")]
        {
            use rustix::fs::{Advice, fadvise};

            let _ = fadvise(&file, 0, None, Advice::Sequential);
        }

        let size = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;

        Ok(Self { file, size })
    }
}

impl ByteSource for FileSource {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        if offset >= self.size {
            return Ok(0);
        }
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read(buf)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// A source backed by a read-only memory map of a file.
pub struct MmapSource {
    mmap: Mmap,
}

impl MmapSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;

        if file.metadata()?.len() == 0 {
            return Err(ScanError::EmptySource(path.display().to_string()));
        }

        // SAFETY: the map is read-only; a file truncated underneath us is the
        // same hazard every mmap reader accepts.
        let mmap = unsafe { Mmap::map(&file) }?;

        if mmap.is_empty() {
            return Err(ScanError::EmptySource(path.display().to_string()));
        }

        #[cfg(unix)]
        {
            let _ = mmap.advise(memmap2::Advice::Sequential);
        }

        Ok(Self { mmap })
    }
}

impl ByteSource for MmapSource {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        Ok(copy_from(&self.mmap, offset, buf))
    }

    fn size(&self) -> u64 {
        self.mmap.len() as u64
    }
}

/// Opens `path` as a file-backed source, memory-mapped when `use_mmap` is set.
///
/// Empty files cannot be mapped and fall back to positioned reads.
pub fn open_path(path: &Path, use_mmap: bool) -> Result<Box<dyn ByteSource + Send>> {
    if use_mmap {
        match MmapSource::open(path) {
            Ok(source) => return Ok(Box::new(source)),
            Err(ScanError::EmptySource(_)) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(Box::new(FileSource::open(path)?))
}

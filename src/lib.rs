//! Read-only views of the leading bytes of a file, backed by a memory map.
//!
//! A view never extends past the end of the file: the requested length is
//! clamped to what the file actually holds, and an empty file is refused
//! rather than mapped. The bytes are exposed as a length-bounded slice; no
//! terminator is assumed.
//!
//! ```no_run
//! let view = mmap_view::open_view("data.txt", 1000)?;
//! println!("{}", String::from_utf8_lossy(view.until_nul()));
//! mmap_view::release(view);
//! # Ok::<(), mmap_view::ViewError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/mmap-view/0.1.0")]

use std::borrow::Borrow;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;
use std::{cmp, fmt, io, slice};

use log::{debug, trace};

mod error;

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use crate::unix::{open_file, MmapInner};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use crate::windows::{open_file, MmapInner};

pub use crate::error::{Result, ViewError};

/// How the mapping relates to other mappings of the same file.
///
/// Both kinds are read-only. A private mapping is copy-on-write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sharing {
    Private,
    Shared,
}

impl Default for Sharing {
    fn default() -> Sharing {
        Sharing::Private
    }
}

/// Configuration for opening a [`MappedView`].
#[derive(Clone, Copy, Debug)]
pub struct ViewOptions {
    max_bytes: usize,
    offset: u64,
    sharing: Sharing,
}

impl ViewOptions {
    /// Views of at most `max_bytes` bytes from the start of the file.
    pub fn new(max_bytes: usize) -> ViewOptions {
        ViewOptions {
            max_bytes,
            offset: 0,
            sharing: Sharing::Private,
        }
    }

    /// Start the view `offset` bytes into the file.
    ///
    /// The offset does not need to be page aligned.
    pub fn offset(&mut self, offset: u64) -> &mut ViewOptions {
        self.offset = offset;
        self
    }

    pub fn sharing(&mut self, sharing: Sharing) -> &mut ViewOptions {
        self.sharing = sharing;
        self
    }

    /// Opens `path` and maps `min(max_bytes, file_len - offset)` bytes of it.
    ///
    /// Whatever was acquired before a failure is released before the error
    /// is returned.
    pub fn open<P>(&self, path: P) -> Result<MappedView>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let result = self.map(path);
        if let Err(ref err) = result {
            debug!("refusing to map {}: {}", path.display(), err);
        }
        result
    }

    fn map(&self, path: &Path) -> Result<MappedView> {
        let file = open_file(path).map_err(|source| ViewError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;

        let metadata = file.metadata().map_err(|source| ViewError::FileStat {
            path: path.to_path_buf(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(ViewError::FileOpen {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        let file_len = metadata.len();
        if file_len == 0 {
            return Err(ViewError::EmptyFile {
                path: path.to_path_buf(),
            });
        }
        if self.offset >= file_len {
            return Err(ViewError::OffsetOutOfRange {
                path: path.to_path_buf(),
                offset: self.offset,
                file_len,
            });
        }

        let remaining = file_len - self.offset;
        // Never larger than max_bytes, so it fits in a usize.
        let len = cmp::min(self.max_bytes as u64, remaining) as usize;

        let inner = MmapInner::open(&file, self.sharing, self.offset, len).map_err(|source| {
            ViewError::Mapping {
                path: path.to_path_buf(),
                source,
            }
        })?;

        debug!(
            "mapped {} bytes of {} at offset {} ({} bytes on disk)",
            len,
            path.display(),
            self.offset,
            file_len
        );

        Ok(MappedView {
            inner,
            _file: file,
            offset: self.offset,
            sharing: self.sharing,
        })
    }
}

impl Default for ViewOptions {
    fn default() -> ViewOptions {
        ViewOptions::new(usize::MAX)
    }
}

/// A read-only, fixed-length view of file contents.
///
/// The view owns both the mapping and the file handle. Dropping it, or
/// passing it to [`release`], unmaps the region and then closes the file.
pub struct MappedView {
    // Field order is drop order: unmap before close.
    inner: MmapInner,
    _file: File,
    offset: u64,
    sharing: Sharing,
}

impl MappedView {
    /// Number of bytes in the view.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position in the file of the first byte of the view.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn sharing(&self) -> Sharing {
        self.sharing
    }

    /// Exactly `len()` bytes; nothing beyond is reachable through the view.
    pub fn as_bytes(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.inner.ptr(), self.inner.len()) }
    }

    /// The bytes before the first NUL, or the whole view if there is none.
    pub fn until_nul(&self) -> &[u8] {
        let bytes = self.as_bytes();
        match bytes.iter().position(|&b| b == 0) {
            Some(end) => &bytes[..end],
            None => bytes,
        }
    }

    /// Unmaps the view and closes its file.
    pub fn release(self) {
        trace!(
            "releasing {} byte view at offset {}",
            self.len(),
            self.offset
        );
        drop(self);
    }
}

/// Opens a private, read-only view of at most `max_bytes` from the start of
/// the file at `path`.
pub fn open_view<P>(path: P, max_bytes: usize) -> Result<MappedView>
where
    P: AsRef<Path>,
{
    ViewOptions::new(max_bytes).open(path)
}

/// Releases a view returned by [`open_view`].
pub fn release(view: MappedView) {
    view.release()
}

/// The mapped bytes, bounded by the length of the view.
pub fn read_as_text(view: &MappedView) -> &[u8] {
    view.as_bytes()
}

impl Deref for MappedView {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for MappedView {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Borrow<[u8]> for MappedView {
    fn borrow(&self) -> &[u8] {
        self.as_bytes()
    }
}

// The mapping does not move when the view does.
unsafe impl stable_deref_trait::StableDeref for MappedView {}

impl fmt::Debug for MappedView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MappedView")
            .field("ptr", &self.inner.ptr())
            .field("len", &self.len())
            .field("offset", &self.offset)
            .field("sharing", &self.sharing)
            .finish()
    }
}

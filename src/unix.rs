use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::{io, ptr};

use crate::Sharing;

impl Sharing {
    /// Returns the `Sharing` value as a POSIX mapping flag.
    fn as_flag(self) -> libc::c_int {
        match self {
            Sharing::Private => libc::MAP_PRIVATE,
            Sharing::Shared => libc::MAP_SHARED,
        }
    }
}

/// Opens `path` read-only.
///
/// `O_NONBLOCK` keeps a FIFO from blocking the open until a writer shows up;
/// it has no effect on regular files.
pub fn open_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
}

pub struct MmapInner {
    ptr: *mut libc::c_void,
    len: usize,
}

impl MmapInner {
    /// Maps `len` bytes of `file` starting at `offset`, read-only.
    ///
    /// The caller guarantees `offset + len` does not pass the end of the file.
    pub fn open(file: &File, sharing: Sharing, offset: u64, len: usize) -> io::Result<MmapInner> {
        if len == 0 {
            return Ok(MmapInner::empty());
        }

        let alignment = (offset % page_size() as u64) as usize;
        let aligned_offset = offset - alignment as u64;
        let aligned_len = len + alignment;

        unsafe {
            let ptr = libc::mmap(
                ptr::null_mut(),
                aligned_len as libc::size_t,
                libc::PROT_READ,
                sharing.as_flag(),
                file.as_raw_fd(),
                aligned_offset as libc::off_t,
            );

            if ptr == libc::MAP_FAILED {
                Err(io::Error::last_os_error())
            } else {
                Ok(MmapInner {
                    ptr: (ptr as *mut u8).add(alignment) as *mut libc::c_void,
                    len,
                })
            }
        }
    }

    fn empty() -> MmapInner {
        MmapInner {
            ptr: ptr::NonNull::<u8>::dangling().as_ptr() as *mut libc::c_void,
            len: 0,
        }
    }

    pub fn ptr(&self) -> *const u8 {
        self.ptr as *const u8
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

impl Drop for MmapInner {
    fn drop(&mut self) {
        if self.len == 0 {
            return;
        }
        let alignment = self.ptr as usize % page_size();
        unsafe {
            let base = (self.ptr as *mut u8).sub(alignment) as *mut libc::c_void;
            assert!(
                libc::munmap(base, (self.len + alignment) as libc::size_t) == 0,
                "unable to unmap mmap: {}",
                io::Error::last_os_error()
            );
        }
    }
}

unsafe impl Sync for MmapInner {}
unsafe impl Send for MmapInner {}

/// Mapping offsets must be a multiple of this.
#[cfg(test)]
pub fn granularity() -> usize {
    page_size()
}

fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

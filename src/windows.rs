use std::fs::File;
use std::os::windows::io::AsRawHandle;
use std::path::Path;
use std::{io, mem, ptr};

use winapi::shared::minwindef::DWORD;
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{
    CreateFileMappingW, MapViewOfFile, UnmapViewOfFile, FILE_MAP_COPY, FILE_MAP_READ,
};
use winapi::um::sysinfoapi::GetSystemInfo;
use winapi::um::winnt::PAGE_READONLY;

use crate::Sharing;

impl Sharing {
    /// Returns the `Sharing` as a flag appropriate for a call to `MapViewOfFile`.
    fn as_view_flag(self) -> DWORD {
        match self {
            Sharing::Private => FILE_MAP_COPY,
            Sharing::Shared => FILE_MAP_READ,
        }
    }
}

pub fn open_file(path: &Path) -> io::Result<File> {
    File::open(path)
}

pub struct MmapInner {
    ptr: *mut u8,
    len: usize,
}

impl MmapInner {
    pub fn open(file: &File, sharing: Sharing, offset: u64, len: usize) -> io::Result<MmapInner> {
        if len == 0 {
            return Ok(MmapInner::empty());
        }

        let alignment = (offset % allocation_granularity() as u64) as usize;
        let aligned_offset = offset - alignment as u64;
        let aligned_len = len + alignment;

        unsafe {
            let handle = CreateFileMappingW(
                file.as_raw_handle() as *mut _,
                ptr::null_mut(),
                PAGE_READONLY,
                0,
                0,
                ptr::null(),
            );
            if handle.is_null() {
                return Err(io::Error::last_os_error());
            }

            let ptr = MapViewOfFile(
                handle,
                sharing.as_view_flag(),
                (aligned_offset >> 32) as DWORD,
                (aligned_offset & 0xffff_ffff) as DWORD,
                aligned_len,
            );
            CloseHandle(handle);

            if ptr.is_null() {
                Err(io::Error::last_os_error())
            } else {
                Ok(MmapInner {
                    ptr: (ptr as *mut u8).add(alignment),
                    len,
                })
            }
        }
    }

    fn empty() -> MmapInner {
        MmapInner {
            ptr: ptr::NonNull::<u8>::dangling().as_ptr(),
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
        let alignment = self.ptr as usize % allocation_granularity();
        unsafe {
            let base = self.ptr.sub(alignment);
            assert!(
                UnmapViewOfFile(base as *const _) != 0,
                "unable to unmap mmap: {}",
                io::Error::last_os_error()
            );
        }
    }
}

unsafe impl Sync for MmapInner {}
unsafe impl Send for MmapInner {}

#[cfg(test)]
pub fn granularity() -> usize {
    allocation_granularity()
}

fn allocation_granularity() -> usize {
    unsafe {
        let mut info = mem::zeroed();
        GetSystemInfo(&mut info);
        info.dwAllocationGranularity as usize
    }
}

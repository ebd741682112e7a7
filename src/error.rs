use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ViewError>;

/// Failure to establish a view. None of these are worth retrying without the
/// caller changing something first.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("unable to open {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to stat {}: {source}", .path.display())]
    FileStat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is empty", .path.display())]
    EmptyFile { path: PathBuf },

    #[error("offset {offset} is past the end of {} ({file_len} bytes)", .path.display())]
    OffsetOutOfRange {
        path: PathBuf,
        offset: u64,
        file_len: u64,
    },

    #[error("unable to map {}: {source}", .path.display())]
    Mapping {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ViewError {
    /// The path the failed view was requested for.
    pub fn path(&self) -> &Path {
        match self {
            ViewError::FileOpen { path, .. }
            | ViewError::FileStat { path, .. }
            | ViewError::EmptyFile { path }
            | ViewError::OffsetOutOfRange { path, .. }
            | ViewError::Mapping { path, .. } => path,
        }
    }

    fn io_kind(&self) -> io::ErrorKind {
        match self {
            ViewError::FileOpen { source, .. }
            | ViewError::FileStat { source, .. }
            | ViewError::Mapping { source, .. } => source.kind(),
            ViewError::EmptyFile { .. } | ViewError::OffsetOutOfRange { .. } => {
                io::ErrorKind::InvalidInput
            }
        }
    }
}

impl From<ViewError> for io::Error {
    fn from(err: ViewError) -> io::Error {
        io::Error::new(err.io_kind(), err)
    }
}

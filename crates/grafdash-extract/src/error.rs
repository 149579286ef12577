//! Error types for artifact extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// An archive path does not exist.
    #[error("archive not found: {path}")]
    ArchiveNotFound { path: PathBuf },

    /// A file could not be read or written.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An archive is not a readable zip file.
    #[error("invalid archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// An entry name would land outside the target directory.
    #[error("unsafe entry '{entry}' in archive {archive}")]
    UnsafeEntry { archive: PathBuf, entry: String },
}

impl ExtractError {
    /// Create an error for an archive that cannot be opened.
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::ArchiveNotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an archive error with path context.
    pub fn archive(path: impl Into<PathBuf>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            path: path.into(),
            source,
        }
    }
}

//! Packaging error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for packaging operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors that can occur while building an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("include path not found: {}: {source}", path.display())]
    MissingPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("compression failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("compression failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid archive entry path: {0}")]
    InvalidEntry(String),

    #[error("archive is empty")]
    Empty,
}

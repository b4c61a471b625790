//! Packaging for sls-deploy.
//!
//! Walks the configured include paths, drops files matching the exclude
//! globs, and compresses the rest into a zip archive that never touches
//! the local disk.

mod archive;
mod error;
mod filter;

pub use archive::{Archive, build_archive};
pub use error::{ArchiveError, ArchiveResult};
pub use filter::{ExcludeFilter, should_exclude};

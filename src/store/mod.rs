//! Metadata store access.
//!
//! Provides a trait-based interface over the tag store embedded in a PDF,
//! isolating the external tool from the document model and the write
//! transaction.

mod config;
mod exiftool;
mod options;
mod raw;
mod transaction;

pub use config::render_config;
pub use exiftool::{check_output, ExifToolBackend};
pub use options::ExifToolOptions;
pub use raw::{RawMetadata, TagState, NULL_TAGS, UNCHECKED_TAGS};
pub use transaction::{BackupGuard, WriteState, WriteTransaction};

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Suffix the metadata tool appends to its pre-write copy of a file.
pub const DEFAULT_BACKUP_SUFFIX: &str = "_original";

/// Abstract interface for reading and writing a file's catalog tags.
///
/// `write` must leave a copy of the previous file at [`backup_path`]
/// whenever it changes the file.
///
/// [`backup_path`]: MetadataBackend::backup_path
pub trait MetadataBackend {
    /// Read every catalog tag of `path` plus its page count.
    fn read(&self, path: &Path) -> Result<RawMetadata>;

    /// Store `raw` in `path`: set every value and clear every tag named in
    /// the null and unchecked lists.
    fn write(&self, path: &Path, raw: &RawMetadata) -> Result<()>;

    /// Where `write` leaves the previous version of `path`.
    fn backup_path(&self, path: &Path) -> PathBuf {
        with_suffix(path, DEFAULT_BACKUP_SUFFIX)
    }
}

/// Append `suffix` to the full file name (`book.pdf` → `book.pdf_original`).
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_suffix() {
        assert_eq!(
            with_suffix(Path::new("scans/book.pdf"), "_original"),
            PathBuf::from("scans/book.pdf_original")
        );
    }
}

//! Shared helpers for integration tests.

#![allow(dead_code)]

use smcmeta::{Error, MetadataBackend, RawMetadata, Result};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Failure injected into [`FakeBackend::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Report "0 image files updated" and leave the file alone.
    ZeroUpdated,
    /// Write everything except this tag.
    DropTag(&'static str),
    /// Replace the file with bytes that do not parse.
    Garbage,
}

/// Backend storing [`RawMetadata`] as JSON in place of the PDF bytes.
///
/// Like exiftool it merges new tags into the stored ones and keeps a
/// `_original` copy of the previous file.
#[derive(Debug, Default)]
pub struct FakeBackend {
    fault: Option<Fault>,
    writes: Cell<usize>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fault(fault: Fault) -> Self {
        Self {
            fault: Some(fault),
            writes: Cell::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl MetadataBackend for FakeBackend {
    fn read(&self, path: &Path) -> Result<RawMetadata> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn write(&self, path: &Path, raw: &RawMetadata) -> Result<()> {
        if self.fault == Some(Fault::ZeroUpdated) {
            return Err(Error::ExternalTool {
                status: Some(0),
                stderr: "0 image files updated".to_string(),
            });
        }

        let mut stored = self.read(path)?;
        fs::copy(path, self.backup_path(path))?;
        self.writes.set(self.writes.get() + 1);

        if self.fault == Some(Fault::Garbage) {
            fs::write(path, "%PDF-1.4 not json")?;
            return Ok(());
        }

        for tag in raw.cleared_tags() {
            stored.values.remove(tag);
        }
        for (tag, value) in &raw.values {
            stored.values.insert(tag.clone(), value.clone());
        }
        stored.null_tags = raw.null_tags.clone();
        stored.unchecked_tags = raw.unchecked_tags.clone();
        if let Some(Fault::DropTag(tag)) = &self.fault {
            stored.values.remove(*tag);
        }
        fs::write(path, serde_json::to_string_pretty(&stored)?)?;
        Ok(())
    }
}

/// A scratch "PDF" with no catalog tags and `page_count` pages.
pub fn blank_pdf(dir: &TempDir, page_count: u32) -> PathBuf {
    let path = dir.path().join("book.pdf");
    let raw = RawMetadata::with_page_count(page_count);
    fs::write(&path, serde_json::to_string_pretty(&raw).unwrap()).unwrap();
    path
}

pub fn backup_of(path: &Path) -> PathBuf {
    FakeBackend::new().backup_path(path)
}

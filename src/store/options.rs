//! Options for the exiftool backend.

use super::DEFAULT_BACKUP_SUFFIX;
use std::path::PathBuf;

/// Default tag group of the catalog namespace.
pub const DEFAULT_GROUP: &str = "XMP-smc";

/// Options for invoking exiftool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExifToolOptions {
    /// Program to run
    pub program: PathBuf,

    /// User config file defining the catalog namespace
    pub config: PathBuf,

    /// Tag group prefix for every catalog tag
    pub group: String,

    /// Suffix exiftool appends to its backup copy
    pub backup_suffix: String,
}

impl ExifToolOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exiftool executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the user config file.
    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.config = config.into();
        self
    }

    /// Set the tag group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Set the backup suffix.
    pub fn with_backup_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.backup_suffix = suffix.into();
        self
    }
}

impl Default for ExifToolOptions {
    fn default() -> Self {
        Self {
            program: PathBuf::from("exiftool"),
            config: PathBuf::from(".ExifTool_config"),
            group: DEFAULT_GROUP.to_string(),
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
        }
    }
}

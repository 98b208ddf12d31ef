//! # smcmeta
//!
//! Catalog metadata for scanned books, stored as XMP inside the PDF.
//!
//! Every field of a record knows whether a reviewer has looked at it. A field
//! nobody checked yet is `Unchecked`; a field a reviewer confirmed empty is
//! `Null` (or an empty list). Records are validated as a whole against the
//! page count of their PDF, and written back with a verify-or-rollback
//! transaction.
//!
//! ## Quick Start
//!
//! ```no_run
//! use smcmeta::{Checked, Nullable};
//!
//! fn main() -> smcmeta::Result<()> {
//!     let mut pdf = smcmeta::load("guide.pdf")?;
//!
//!     pdf.update(|fields| {
//!         fields.title = Nullable::Set("The British Mariner's Guide".to_string());
//!         fields.authors = Checked::Set(vec!["Maskelyne, Nevil".to_string()]);
//!     })?;
//!
//!     smcmeta::write(&pdf)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Review states**: unchecked, confirmed absent, and set are distinct
//! - **Whole-record validation**: page bounds and page ordering of sections,
//!   graphics and page tags
//! - **Transactional writes**: the file is re-read after writing and
//!   restored from its backup if it does not match
//! - **Dynamic access**: get and set fields by name with raw JSON values

pub mod error;
pub mod model;
pub mod store;

pub use error::{Error, Result, RoundTripFailure, ValidationError};
pub use model::{
    Checked, Graphic, GraphicColor, GraphicContent, GraphicKind, NumberKind, Nullable, PageKind,
    PageTag, Pdf, PdfFields, PublishingFrequency, Section, SectionKind,
};
pub use store::{
    render_config, ExifToolBackend, ExifToolOptions, MetadataBackend, RawMetadata, TagState,
    WriteState, WriteTransaction,
};

use std::path::Path;

/// Load the catalog metadata of a PDF with the default exiftool setup.
///
/// # Example
///
/// ```no_run
/// let pdf = smcmeta::load("guide.pdf").unwrap();
/// println!("Unchecked: {:?}", pdf.unchecked_fields());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Pdf> {
    Pdf::load(&ExifToolBackend::new(), path)
}

/// Load the catalog metadata of a PDF with custom exiftool options.
///
/// # Example
///
/// ```no_run
/// use smcmeta::{load_with_options, ExifToolOptions};
///
/// let options = ExifToolOptions::new().with_config("conf/smc.config");
/// let pdf = load_with_options("guide.pdf", options).unwrap();
/// ```
pub fn load_with_options<P: AsRef<Path>>(path: P, options: ExifToolOptions) -> Result<Pdf> {
    Pdf::load(&ExifToolBackend::with_options(options), path)
}

/// Write a record back into its PDF with the default exiftool setup.
pub fn write(pdf: &Pdf) -> Result<()> {
    pdf.write(&ExifToolBackend::new())
}

/// Write a record back into its PDF with custom exiftool options.
pub fn write_with_options(pdf: &Pdf, options: ExifToolOptions) -> Result<()> {
    pdf.write(&ExifToolBackend::with_options(options))
}

//! Typed catalog metadata.
//!
//! Every field carries a review state as well as a value: a field nobody has
//! looked at ([`Nullable::Unchecked`]) is kept apart from a field a reviewer
//! confirmed empty ([`Nullable::Null`], or an empty list). Records validate
//! as a whole, against the page count of the PDF they describe.

mod codec;
mod document;
mod graphic;
mod page_tag;
mod rules;
pub mod schema;
mod section;
mod value;
mod vocab;

pub use codec::{TagReader, TagValue, TagWriter, NULL_FIELDS_KEY};
pub use document::{Pdf, PdfFields};
pub use graphic::{Graphic, GraphicBuilder};
pub use page_tag::PageTag;
pub use schema::{FieldSpec, Presence, Shape};
pub use section::{Section, SectionBuilder};
pub use value::{Checked, Nullable};
pub use vocab::{
    GraphicColor, GraphicContent, GraphicKind, NumberKind, PageKind, PublishingFrequency,
    SectionKind, UnknownTerm,
};

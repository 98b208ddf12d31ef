//! Figures, plates and tables printed in a book.

use super::codec::{join_path, TagReader, TagValue, TagWriter};
use super::rules;
use super::schema::GRAPHIC_FIELDS;
use super::value::{Checked, Nullable};
use super::vocab::{GraphicColor, GraphicContent, GraphicKind};
use crate::error::ValidationError;
use serde_json::Value;

/// A depicted figure, plate or table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graphic {
    pub kind: Checked<GraphicKind>,
    pub content: Nullable<GraphicContent>,
    pub first_page: u32,
    /// Null when the graphic fits on its first page.
    pub last_page: Nullable<u32>,
    pub color: Nullable<GraphicColor>,
}

impl Graphic {
    /// Create a graphic with only its first page known.
    pub fn new(first_page: u32) -> Self {
        Self {
            kind: Checked::Unchecked,
            content: Nullable::Unchecked,
            first_page,
            last_page: Nullable::Unchecked,
            color: Nullable::Unchecked,
        }
    }

    /// Start building a validated graphic.
    pub fn builder(first_page: u32) -> GraphicBuilder {
        GraphicBuilder {
            graphic: Self::new(first_page),
        }
    }

    /// Check the graphic against a document with `page_count` pages.
    pub fn validate(&self, page_count: u32) -> Result<(), ValidationError> {
        self.validate_at("", page_count)
    }

    pub(crate) fn validate_at(&self, prefix: &str, page_count: u32) -> Result<(), ValidationError> {
        rules::page(join_path(prefix, "first_page"), self.first_page, page_count)?;
        if let Some(last) = self.last_page.value() {
            rules::page(join_path(prefix, "last_page"), *last, page_count)?;
        }
        rules::ordered(
            prefix,
            ("first_page", Some(self.first_page)),
            ("last_page", self.last_page.value().copied()),
        )
    }
}

impl TagValue for Graphic {
    fn from_tag(value: &Value, field: &str) -> Result<Self, ValidationError> {
        let r = TagReader::for_struct(value, field, GRAPHIC_FIELDS)?;
        Ok(Self {
            kind: r.checked("kind")?,
            content: r.nullable("content")?,
            first_page: r.required("first_page")?,
            last_page: r.nullable("last_page")?,
            color: r.nullable("color")?,
        })
    }

    fn to_tag(&self) -> Value {
        let mut w = TagWriter::new();
        w.checked("kind", &self.kind);
        w.nullable("content", &self.content);
        w.required("first_page", &self.first_page);
        w.nullable("last_page", &self.last_page);
        w.nullable("color", &self.color);
        w.into_struct()
    }
}

/// Builder for [`Graphic`]; `build` runs the graphic's validators.
#[derive(Debug, Clone)]
pub struct GraphicBuilder {
    graphic: Graphic,
}

impl GraphicBuilder {
    pub fn with_kind(mut self, kind: GraphicKind) -> Self {
        self.graphic.kind = Checked::Set(kind);
        self
    }

    pub fn with_content(mut self, content: GraphicContent) -> Self {
        self.graphic.content = Nullable::Set(content);
        self
    }

    pub fn with_last_page(mut self, last: u32) -> Self {
        self.graphic.last_page = Nullable::Set(last);
        self
    }

    /// The graphic occupies its first page only.
    pub fn single_page(mut self) -> Self {
        self.graphic.last_page = Nullable::Null;
        self
    }

    pub fn with_color(mut self, color: GraphicColor) -> Self {
        self.graphic.color = Nullable::Set(color);
        self
    }

    /// Validate against a document with `page_count` pages.
    pub fn build(self, page_count: u32) -> Result<Graphic, ValidationError> {
        self.graphic.validate(page_count)?;
        Ok(self.graphic)
    }
}

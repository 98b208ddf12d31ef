//! Structural divisions of a book.

use super::codec::{join_path, TagReader, TagValue, TagWriter};
use super::rules;
use super::schema::SECTION_FIELDS;
use super::value::{Checked, Nullable};
use super::vocab::{NumberKind, SectionKind};
use crate::error::ValidationError;
use serde_json::Value;

/// A chapter, preface, index or similar division.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: Checked<SectionKind>,
    /// What the book itself calls this division ("Lecture", "Book").
    pub kind_in_book: Checked<String>,
    pub title: Nullable<String>,
    pub authors: Checked<Vec<String>>,
    pub number: Nullable<u32>,
    pub number_kind: Nullable<NumberKind>,
    /// Edition this section first appeared in.
    pub for_edition: Nullable<u32>,
    /// Page carrying the section heading.
    pub heading_page: u32,
    pub first_page: Checked<u32>,
    pub last_page: Checked<u32>,
    pub section_topics: Checked<Vec<String>>,
}

impl Section {
    /// Create a section with only its heading page known.
    pub fn new(heading_page: u32) -> Self {
        Self {
            kind: Checked::Unchecked,
            kind_in_book: Checked::Unchecked,
            title: Nullable::Unchecked,
            authors: Checked::Unchecked,
            number: Nullable::Unchecked,
            number_kind: Nullable::Unchecked,
            for_edition: Nullable::Unchecked,
            heading_page,
            first_page: Checked::Unchecked,
            last_page: Checked::Unchecked,
            section_topics: Checked::Unchecked,
        }
    }

    /// Start building a validated section.
    pub fn builder(heading_page: u32) -> SectionBuilder {
        SectionBuilder {
            section: Self::new(heading_page),
        }
    }

    /// Check the section against a document with `page_count` pages.
    pub fn validate(&self, page_count: u32) -> Result<(), ValidationError> {
        self.validate_at("", page_count)
    }

    pub(crate) fn validate_at(&self, prefix: &str, page_count: u32) -> Result<(), ValidationError> {
        rules::checked_text(prefix, "kind_in_book", &self.kind_in_book)?;
        rules::text(prefix, "title", &self.title)?;
        rules::names(prefix, "authors", &self.authors)?;
        rules::number(prefix, "number", &self.number)?;
        rules::number(prefix, "for_edition", &self.for_edition)?;
        rules::names(prefix, "section_topics", &self.section_topics)?;

        rules::page(join_path(prefix, "heading_page"), self.heading_page, page_count)?;
        if let Some(first) = self.first_page.value() {
            rules::page(join_path(prefix, "first_page"), *first, page_count)?;
        }
        if let Some(last) = self.last_page.value() {
            rules::page(join_path(prefix, "last_page"), *last, page_count)?;
        }

        let first = ("first_page", self.first_page.value().copied());
        let heading = ("heading_page", Some(self.heading_page));
        let last = ("last_page", self.last_page.value().copied());
        rules::ordered(prefix, first, last)?;
        rules::ordered(prefix, first, heading)?;
        rules::ordered(prefix, heading, last)
    }
}

impl TagValue for Section {
    fn from_tag(value: &Value, field: &str) -> Result<Self, ValidationError> {
        let r = TagReader::for_struct(value, field, SECTION_FIELDS)?;
        Ok(Self {
            kind: r.checked("kind")?,
            kind_in_book: r.checked("kind_in_book")?,
            title: r.nullable("title")?,
            authors: r.checked("authors")?,
            number: r.nullable("number")?,
            number_kind: r.nullable("number_kind")?,
            for_edition: r.nullable("for_edition")?,
            heading_page: r.required("heading_page")?,
            first_page: r.checked("first_page")?,
            last_page: r.checked("last_page")?,
            section_topics: r.checked("section_topics")?,
        })
    }

    fn to_tag(&self) -> Value {
        let mut w = TagWriter::new();
        w.checked("kind", &self.kind);
        w.checked("kind_in_book", &self.kind_in_book);
        w.nullable("title", &self.title);
        w.checked("authors", &self.authors);
        w.nullable("number", &self.number);
        w.nullable("number_kind", &self.number_kind);
        w.nullable("for_edition", &self.for_edition);
        w.required("heading_page", &self.heading_page);
        w.checked("first_page", &self.first_page);
        w.checked("last_page", &self.last_page);
        w.checked("section_topics", &self.section_topics);
        w.into_struct()
    }
}

/// Builder for [`Section`]; `build` runs the section's validators.
#[derive(Debug, Clone)]
pub struct SectionBuilder {
    section: Section,
}

impl SectionBuilder {
    pub fn with_kind(mut self, kind: SectionKind) -> Self {
        self.section.kind = Checked::Set(kind);
        self
    }

    pub fn with_kind_in_book(mut self, kind: impl Into<String>) -> Self {
        self.section.kind_in_book = Checked::Set(kind.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.section.title = Nullable::Set(title.into());
        self
    }

    /// Mark the section as having no title.
    pub fn untitled(mut self) -> Self {
        self.section.title = Nullable::Null;
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.section.authors = Checked::Set(authors.into_iter().map(Into::into).collect());
        self
    }

    /// Set the section number and how it is printed.
    pub fn with_number(mut self, number: u32, kind: NumberKind) -> Self {
        self.section.number = Nullable::Set(number);
        self.section.number_kind = Nullable::Set(kind);
        self
    }

    /// Mark the section as unnumbered.
    pub fn unnumbered(mut self) -> Self {
        self.section.number = Nullable::Null;
        self.section.number_kind = Nullable::Null;
        self
    }

    pub fn with_for_edition(mut self, edition: u32) -> Self {
        self.section.for_edition = Nullable::Set(edition);
        self
    }

    /// Set the first and last page.
    pub fn with_pages(mut self, first: u32, last: u32) -> Self {
        self.section.first_page = Checked::Set(first);
        self.section.last_page = Checked::Set(last);
        self
    }

    pub fn with_first_page(mut self, first: u32) -> Self {
        self.section.first_page = Checked::Set(first);
        self
    }

    pub fn with_last_page(mut self, last: u32) -> Self {
        self.section.last_page = Checked::Set(last);
        self
    }

    pub fn with_topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.section.section_topics = Checked::Set(topics.into_iter().map(Into::into).collect());
        self
    }

    /// Validate against a document with `page_count` pages.
    pub fn build(self, page_count: u32) -> Result<Section, ValidationError> {
        self.section.validate(page_count)?;
        Ok(self.section)
    }
}

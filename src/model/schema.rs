//! Static field registry.
//!
//! Every record type lists its fields here once. Loading, serializing,
//! dynamic field access, tool-output normalization and the exiftool config
//! generator all consult these tables instead of enumerating struct fields.

use super::vocab::{
    GraphicColor, GraphicContent, GraphicKind, NumberKind, PageKind, PublishingFrequency,
    SectionKind,
};

/// Structural fields that are never written back to the file.
pub const READ_ONLY_FIELDS: [&str; 2] = ["source_file", "page_count"];

/// Value shape of a field (or of each item, for list fields).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Non-blank text.
    Text,
    /// Positive integer.
    Integer,
    /// Page number, bounded by the document's page count.
    Page,
    /// True or false.
    Boolean,
    /// ISO date (`YYYY-MM-DD`).
    Date,
    /// One term out of a fixed list.
    Vocabulary(&'static [&'static str]),
    /// Nested record with its own fields.
    Struct(&'static str, &'static [FieldSpec]),
}

impl Shape {
    /// Short human-readable description.
    pub fn describe(&self) -> String {
        match self {
            Shape::Text => "text".to_string(),
            Shape::Integer => "positive integer".to_string(),
            Shape::Page => "page number".to_string(),
            Shape::Boolean => "boolean".to_string(),
            Shape::Date => "date".to_string(),
            Shape::Vocabulary(values) => format!("one of {}", values.join("|")),
            Shape::Struct(name, _) => name.to_string(),
        }
    }
}

/// Which review states a field admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Unchecked, null, or a value.
    Nullable,
    /// Unchecked or a value.
    Checked,
    /// Unchecked or a list; the empty list means confirmed absent.
    List,
    /// Always a value.
    Required,
}

/// One entry of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// snake_case field name.
    pub name: &'static str,
    pub shape: Shape,
    pub presence: Presence,
}

impl FieldSpec {
    const fn new(name: &'static str, shape: Shape, presence: Presence) -> Self {
        Self {
            name,
            shape,
            presence,
        }
    }

    const fn nullable(name: &'static str, shape: Shape) -> Self {
        Self::new(name, shape, Presence::Nullable)
    }

    const fn checked(name: &'static str, shape: Shape) -> Self {
        Self::new(name, shape, Presence::Checked)
    }

    const fn list(name: &'static str, shape: Shape) -> Self {
        Self::new(name, shape, Presence::List)
    }

    const fn required(name: &'static str, shape: Shape) -> Self {
        Self::new(name, shape, Presence::Required)
    }

    /// CamelCase tag name used in the metadata store.
    pub fn tag(&self) -> String {
        to_camel(self.name)
    }

    /// Whether the field holds a list of items.
    pub fn is_list(&self) -> bool {
        self.presence == Presence::List
    }

    /// Whether null is a legal state (lists excluded).
    pub fn is_nullable(&self) -> bool {
        self.presence == Presence::Nullable
    }
}

/// Fields of a [`Section`](super::Section).
pub const SECTION_FIELDS: &[FieldSpec] = &[
    FieldSpec::checked("kind", Shape::Vocabulary(SectionKind::VALUES)),
    FieldSpec::checked("kind_in_book", Shape::Text),
    FieldSpec::nullable("title", Shape::Text),
    FieldSpec::list("authors", Shape::Text),
    FieldSpec::nullable("number", Shape::Integer),
    FieldSpec::nullable("number_kind", Shape::Vocabulary(NumberKind::VALUES)),
    FieldSpec::nullable("for_edition", Shape::Integer),
    FieldSpec::required("heading_page", Shape::Page),
    FieldSpec::checked("first_page", Shape::Page),
    FieldSpec::checked("last_page", Shape::Page),
    FieldSpec::list("section_topics", Shape::Text),
];

/// Fields of a [`Graphic`](super::Graphic).
pub const GRAPHIC_FIELDS: &[FieldSpec] = &[
    FieldSpec::checked("kind", Shape::Vocabulary(GraphicKind::VALUES)),
    FieldSpec::nullable("content", Shape::Vocabulary(GraphicContent::VALUES)),
    FieldSpec::required("first_page", Shape::Page),
    FieldSpec::nullable("last_page", Shape::Page),
    FieldSpec::nullable("color", Shape::Vocabulary(GraphicColor::VALUES)),
];

/// Fields of a [`PageTag`](super::PageTag).
pub const PAGE_TAG_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("kind", Shape::Vocabulary(PageKind::VALUES)),
    FieldSpec::list("pages", Shape::Page),
];

/// Editable fields of a [`Pdf`](super::Pdf), in tag order.
pub const PDF_FIELDS: &[FieldSpec] = &[
    FieldSpec::nullable("url", Shape::Text),
    FieldSpec::list("authors", Shape::Text),
    FieldSpec::list("editors", Shape::Text),
    FieldSpec::list("translators", Shape::Text),
    FieldSpec::nullable("date_published", Shape::Date),
    FieldSpec::nullable(
        "publishing_frequency",
        Shape::Vocabulary(PublishingFrequency::VALUES),
    ),
    FieldSpec::nullable("title", Shape::Text),
    FieldSpec::nullable("subtitle", Shape::Text),
    FieldSpec::nullable("long_title", Shape::Text),
    FieldSpec::nullable("edition", Shape::Integer),
    FieldSpec::nullable("volume", Shape::Integer),
    FieldSpec::nullable("in_copyright", Shape::Boolean),
    FieldSpec::list("copyright_years", Shape::Integer),
    FieldSpec::list("publishers", Shape::Text),
    FieldSpec::list("publisher_cities", Shape::Text),
    FieldSpec::list("printers", Shape::Text),
    FieldSpec::nullable("printing_number", Shape::Integer),
    FieldSpec::nullable("numbers_offset", Shape::Page),
    FieldSpec::nullable("roman_numbers_offset", Shape::Page),
    FieldSpec::checked("has_ligatures", Shape::Boolean),
    FieldSpec::list("book_topics", Shape::Text),
    FieldSpec::list("sections", Shape::Struct("Section", SECTION_FIELDS)),
    FieldSpec::list("graphics", Shape::Struct("Graphic", GRAPHIC_FIELDS)),
    FieldSpec::list("page_tags", Shape::Struct("PageTag", PAGE_TAG_FIELDS)),
];

/// Convert a snake_case field name to its CamelCase tag name.
pub fn to_camel(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Look up a field by snake_case name.
pub fn find_field(fields: &'static [FieldSpec], name: &str) -> Option<&'static FieldSpec> {
    fields.iter().find(|spec| spec.name == name)
}

/// Look up a field by CamelCase tag name.
pub fn find_tag(fields: &'static [FieldSpec], tag: &str) -> Option<&'static FieldSpec> {
    fields.iter().find(|spec| spec.tag() == tag)
}

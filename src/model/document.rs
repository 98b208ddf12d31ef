//! The document record: bibliographic fields plus sub-records of one PDF.

use super::codec::{TagReader, TagWriter};
use super::graphic::Graphic;
use super::page_tag::PageTag;
use super::rules;
use super::schema::{find_field, find_tag, FieldSpec, PDF_FIELDS, READ_ONLY_FIELDS};
use super::section::Section;
use super::value::{Checked, Nullable};
use super::vocab::PublishingFrequency;
use crate::error::{Error, Result, ValidationError};
use crate::store::{MetadataBackend, RawMetadata, TagState, WriteTransaction};
use chrono::NaiveDate;
use log::warn;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Editable fields of a [`Pdf`].
///
/// `Default` leaves every field unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PdfFields {
    pub url: Nullable<String>,
    pub authors: Checked<Vec<String>>,
    pub editors: Checked<Vec<String>>,
    pub translators: Checked<Vec<String>>,
    pub date_published: Nullable<NaiveDate>,
    pub publishing_frequency: Nullable<PublishingFrequency>,
    pub title: Nullable<String>,
    pub subtitle: Nullable<String>,
    pub long_title: Nullable<String>,
    pub edition: Nullable<u32>,
    pub volume: Nullable<u32>,
    pub in_copyright: Nullable<bool>,
    pub copyright_years: Checked<Vec<u32>>,
    pub publishers: Checked<Vec<String>>,
    pub publisher_cities: Checked<Vec<String>>,
    pub printers: Checked<Vec<String>>,
    pub printing_number: Nullable<u32>,
    /// PDF page that carries printed page 1.
    pub numbers_offset: Nullable<u32>,
    /// PDF page that carries printed page i.
    pub roman_numbers_offset: Nullable<u32>,
    pub has_ligatures: Checked<bool>,
    pub book_topics: Checked<Vec<String>>,
    pub sections: Checked<Vec<Section>>,
    pub graphics: Checked<Vec<Graphic>>,
    pub page_tags: Checked<Vec<PageTag>>,
}

impl PdfFields {
    /// Decode every field from flat tags.
    pub fn read(r: &TagReader<'_>) -> std::result::Result<Self, ValidationError> {
        Ok(Self {
            url: r.nullable("url")?,
            authors: r.checked("authors")?,
            editors: r.checked("editors")?,
            translators: r.checked("translators")?,
            date_published: r.nullable("date_published")?,
            publishing_frequency: r.nullable("publishing_frequency")?,
            title: r.nullable("title")?,
            subtitle: r.nullable("subtitle")?,
            long_title: r.nullable("long_title")?,
            edition: r.nullable("edition")?,
            volume: r.nullable("volume")?,
            in_copyright: r.nullable("in_copyright")?,
            copyright_years: r.checked("copyright_years")?,
            publishers: r.checked("publishers")?,
            publisher_cities: r.checked("publisher_cities")?,
            printers: r.checked("printers")?,
            printing_number: r.nullable("printing_number")?,
            numbers_offset: r.nullable("numbers_offset")?,
            roman_numbers_offset: r.nullable("roman_numbers_offset")?,
            has_ligatures: r.checked("has_ligatures")?,
            book_topics: r.checked("book_topics")?,
            sections: r.checked("sections")?,
            graphics: r.checked("graphics")?,
            page_tags: r.checked("page_tags")?,
        })
    }

    /// Encode every field, in registry order.
    pub fn write(&self, w: &mut TagWriter) {
        w.nullable("url", &self.url);
        w.checked("authors", &self.authors);
        w.checked("editors", &self.editors);
        w.checked("translators", &self.translators);
        w.nullable("date_published", &self.date_published);
        w.nullable("publishing_frequency", &self.publishing_frequency);
        w.nullable("title", &self.title);
        w.nullable("subtitle", &self.subtitle);
        w.nullable("long_title", &self.long_title);
        w.nullable("edition", &self.edition);
        w.nullable("volume", &self.volume);
        w.nullable("in_copyright", &self.in_copyright);
        w.checked("copyright_years", &self.copyright_years);
        w.checked("publishers", &self.publishers);
        w.checked("publisher_cities", &self.publisher_cities);
        w.checked("printers", &self.printers);
        w.nullable("printing_number", &self.printing_number);
        w.nullable("numbers_offset", &self.numbers_offset);
        w.nullable("roman_numbers_offset", &self.roman_numbers_offset);
        w.checked("has_ligatures", &self.has_ligatures);
        w.checked("book_topics", &self.book_topics);
        w.checked("sections", &self.sections);
        w.checked("graphics", &self.graphics);
        w.checked("page_tags", &self.page_tags);
    }

    /// Run every field and cross-field rule against a document with
    /// `page_count` pages.
    pub fn validate(&self, page_count: u32) -> std::result::Result<(), ValidationError> {
        rules::text("", "url", &self.url)?;
        rules::names("", "authors", &self.authors)?;
        rules::names("", "editors", &self.editors)?;
        rules::names("", "translators", &self.translators)?;
        if let Some(date) = self.date_published.value() {
            rules::not_future("date_published".to_string(), date)?;
        }
        rules::text("", "title", &self.title)?;
        rules::text("", "subtitle", &self.subtitle)?;
        rules::text("", "long_title", &self.long_title)?;
        rules::number("", "edition", &self.edition)?;
        rules::number("", "volume", &self.volume)?;
        for (i, year) in self.copyright_years.iter().enumerate() {
            rules::positive(format!("copyright_years[{}]", i), *year)?;
        }
        rules::names("", "publishers", &self.publishers)?;
        rules::names("", "publisher_cities", &self.publisher_cities)?;
        rules::names("", "printers", &self.printers)?;
        rules::number("", "printing_number", &self.printing_number)?;
        if let Some(offset) = self.numbers_offset.value() {
            rules::page("numbers_offset".to_string(), *offset, page_count)?;
        }
        if let Some(offset) = self.roman_numbers_offset.value() {
            rules::page("roman_numbers_offset".to_string(), *offset, page_count)?;
        }
        rules::names("", "book_topics", &self.book_topics)?;

        for (i, section) in self.sections.iter().enumerate() {
            section.validate_at(&format!("sections[{}]", i), page_count)?;
        }
        for (i, graphic) in self.graphics.iter().enumerate() {
            graphic.validate_at(&format!("graphics[{}]", i), page_count)?;
        }
        let mut kinds = HashSet::new();
        for (i, tag) in self.page_tags.iter().enumerate() {
            let prefix = format!("page_tags[{}]", i);
            tag.validate_at(&prefix, page_count)?;
            if !kinds.insert(tag.kind) {
                return Err(ValidationError::DuplicatePageKind {
                    field: format!("{}.kind", prefix),
                    kind: tag.kind.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Catalog metadata of one PDF file.
///
/// The file path and page count are fixed when the record is created; every
/// other field is edited through [`Pdf::update`] or the dynamic
/// [`Pdf::set_field`] family, which validate the whole record and leave it
/// unchanged on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdf {
    source_file: PathBuf,
    page_count: u32,
    fields: PdfFields,
}

impl Pdf {
    /// Create a record with every field unchecked.
    pub fn new(source_file: impl Into<PathBuf>, page_count: u32) -> Self {
        Self {
            source_file: source_file.into(),
            page_count,
            fields: PdfFields::default(),
        }
    }

    /// Read and decode the metadata stored in `path`.
    pub fn load<B, P>(backend: &B, path: P) -> Result<Self>
    where
        B: MetadataBackend + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let raw = backend.read(path)?;
        Self::from_raw(path, &raw)
    }

    /// Build a record from flat tags. Tags outside the registry are ignored.
    pub fn from_raw(source_file: impl Into<PathBuf>, raw: &RawMetadata) -> Result<Self> {
        let source_file = source_file.into();
        let page_count = match raw.page_count {
            Some(count) if count > 0 => count,
            _ => return Err(Error::MissingPageCount(source_file)),
        };
        for tag in raw.values.keys() {
            if find_tag(PDF_FIELDS, tag).is_none() {
                warn!("Ignoring unknown tag {} in {}", tag, source_file.display());
            }
        }
        Ok(Self::decode(source_file, page_count, raw)?)
    }

    fn decode(
        source_file: PathBuf,
        page_count: u32,
        raw: &RawMetadata,
    ) -> std::result::Result<Self, ValidationError> {
        let reader = TagReader::new(&raw.values, &raw.null_tags, &raw.unchecked_tags);
        let fields = PdfFields::read(&reader)?;
        fields.validate(page_count)?;
        Ok(Self {
            source_file,
            page_count,
            fields,
        })
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn fields(&self) -> &PdfFields {
        &self.fields
    }

    /// Apply `edit` to a copy of the fields and keep it only if the whole
    /// record still validates.
    pub fn update<F>(&mut self, edit: F) -> std::result::Result<(), ValidationError>
    where
        F: FnOnce(&mut PdfFields),
    {
        let mut fields = self.fields.clone();
        edit(&mut fields);
        fields.validate(self.page_count)?;
        self.fields = fields;
        Ok(())
    }

    /// Check every field and cross-field rule.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        self.fields.validate(self.page_count)
    }

    /// Flatten into tags, sorting null and empty fields into the null list
    /// and unreviewed fields into the unchecked list. Read-only fields are
    /// not included.
    pub fn serialize(&self) -> RawMetadata {
        let mut writer = TagWriter::new();
        self.fields.write(&mut writer);
        let (values, null_tags, unchecked_tags) = writer.into_parts();
        RawMetadata {
            values,
            null_tags,
            unchecked_tags,
            page_count: None,
        }
    }

    /// Current state of a field by snake_case name. List fields report an
    /// empty list rather than null.
    pub fn field(&self, name: &str) -> std::result::Result<TagState, ValidationError> {
        match name {
            "source_file" => {
                return Ok(TagState::Value(Value::String(
                    self.source_file.display().to_string(),
                )))
            }
            "page_count" => return Ok(TagState::Value(Value::from(self.page_count))),
            _ => {}
        }
        let spec = lookup(name)?;
        let state = self.serialize().state(&spec.tag());
        Ok(match state {
            TagState::Null if spec.is_list() => TagState::Value(Value::Array(Vec::new())),
            other => other,
        })
    }

    /// Set a field from its raw JSON form. `null` confirms the field absent
    /// (for lists, the same as `[]`).
    pub fn set_field(&mut self, name: &str, value: Value) -> std::result::Result<(), ValidationError> {
        let spec = editable(name)?;
        let mut raw = self.serialize();
        if value.is_null() {
            if !spec.is_nullable() && !spec.is_list() {
                return Err(ValidationError::NotNullable {
                    field: name.to_string(),
                });
            }
            raw.set_null(&spec.tag());
        } else {
            raw.set_value(&spec.tag(), value);
        }
        self.replace(&raw)
    }

    /// Mark a field as not yet reviewed.
    pub fn uncheck_field(&mut self, name: &str) -> std::result::Result<(), ValidationError> {
        let spec = editable(name)?;
        let mut raw = self.serialize();
        raw.set_unchecked(&spec.tag());
        self.replace(&raw)
    }

    fn replace(&mut self, raw: &RawMetadata) -> std::result::Result<(), ValidationError> {
        *self = Self::decode(self.source_file.clone(), self.page_count, raw)?;
        Ok(())
    }

    /// Names of the fields whose state differs between two records.
    pub fn diff(&self, other: &Pdf) -> Vec<String> {
        let mut changed = Vec::new();
        if self.source_file != other.source_file {
            changed.push("source_file".to_string());
        }
        if self.page_count != other.page_count {
            changed.push("page_count".to_string());
        }
        let (ours, theirs) = (self.serialize(), other.serialize());
        for spec in PDF_FIELDS {
            let tag = spec.tag();
            if ours.state(&tag) != theirs.state(&tag) {
                changed.push(spec.name.to_string());
            }
        }
        changed
    }

    /// Fields nobody has reviewed yet, in registry order.
    pub fn unchecked_fields(&self) -> Vec<&'static str> {
        let raw = self.serialize();
        PDF_FIELDS
            .iter()
            .filter(|spec| raw.state(&spec.tag()) == TagState::Unchecked)
            .map(|spec| spec.name)
            .collect()
    }

    /// Persist the record into its file, verifying the result and restoring
    /// the previous file if it does not read back identically.
    pub fn write<B: MetadataBackend + ?Sized>(&self, backend: &B) -> Result<()> {
        self.validate()?;
        WriteTransaction::new(backend, self).run()
    }
}

fn lookup(name: &str) -> std::result::Result<&'static FieldSpec, ValidationError> {
    find_field(PDF_FIELDS, name).ok_or_else(|| ValidationError::UnknownField(name.to_string()))
}

fn editable(name: &str) -> std::result::Result<&'static FieldSpec, ValidationError> {
    if READ_ONLY_FIELDS.contains(&name) {
        return Err(ValidationError::ReadOnly(name.to_string()));
    }
    lookup(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GraphicKind, NumberKind, PageKind, SectionKind};
    use serde_json::json;

    fn pdf() -> Pdf {
        Pdf::new("book.pdf", 20)
    }

    #[test]
    fn test_fresh_fields_are_unchecked() {
        let pdf = pdf();
        for spec in PDF_FIELDS {
            assert_eq!(pdf.field(spec.name).unwrap(), TagState::Unchecked, "{}", spec.name);
        }
        assert_eq!(pdf.unchecked_fields().len(), PDF_FIELDS.len());
    }

    #[test]
    fn test_writer_covers_registry() {
        let raw = pdf().serialize();
        let expected: Vec<String> = PDF_FIELDS.iter().map(FieldSpec::tag).collect();
        assert_eq!(raw.unchecked_tags, expected);
        assert!(raw.values.is_empty());
        assert!(raw.page_count.is_none());
    }

    #[test]
    fn test_nullable_fields_read_back_null() {
        let mut pdf = pdf();
        for spec in PDF_FIELDS.iter().filter(|spec| spec.is_nullable()) {
            pdf.set_field(spec.name, Value::Null).unwrap();
            assert_eq!(pdf.field(spec.name).unwrap(), TagState::Null, "{}", spec.name);
        }
    }

    #[test]
    fn test_list_fields_read_back_empty() {
        let mut pdf = pdf();
        for spec in PDF_FIELDS.iter().filter(|spec| spec.is_list()) {
            pdf.set_field(spec.name, json!([])).unwrap();
            assert_eq!(
                pdf.field(spec.name).unwrap(),
                TagState::Value(json!([])),
                "{}",
                spec.name
            );
        }
        assert!(pdf.fields().authors.is_confirmed_empty());
        assert!(pdf.fields().sections.is_confirmed_empty());
    }

    #[test]
    fn test_null_rejected_for_checked_field() {
        let mut pdf = pdf();
        let err = pdf.set_field("has_ligatures", Value::Null).unwrap_err();
        assert!(matches!(err, ValidationError::NotNullable { .. }));
        assert_eq!(pdf.fields().has_ligatures, Checked::Unchecked);
    }

    #[test]
    fn test_set_field_normalizes_year() {
        let mut pdf = pdf();
        pdf.set_field("date_published", json!(1763)).unwrap();
        assert_eq!(
            pdf.field("date_published").unwrap(),
            TagState::Value(json!("1763-01-01"))
        );

        for year in [json!(63), json!(0), json!(-44)] {
            let err = pdf.set_field("date_published", year).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidDate { .. }));
        }
        assert_eq!(
            pdf.field("date_published").unwrap(),
            TagState::Value(json!("1763-01-01"))
        );
    }

    #[test]
    fn test_failed_assignment_keeps_prior_value() {
        let mut pdf = pdf();
        pdf.set_field("title", json!("Tables")).unwrap();
        assert!(pdf.set_field("title", json!("  ")).is_err());
        assert!(pdf.set_field("title", json!([])).is_err());
        assert!(pdf.set_field("authors", json!("")).is_err());
        assert!(pdf.set_field("edition", json!(0)).is_err());
        assert_eq!(pdf.fields().title, Nullable::Set("Tables".to_string()));
        assert_eq!(pdf.fields().edition, Nullable::Unchecked);
    }

    #[test]
    fn test_read_only_and_unknown_fields() {
        let mut pdf = pdf();
        assert_eq!(
            pdf.set_field("page_count", json!(3)).unwrap_err(),
            ValidationError::ReadOnly("page_count".to_string())
        );
        assert!(matches!(
            pdf.set_field("plates", json!([])),
            Err(ValidationError::UnknownField(_))
        ));
        assert_eq!(pdf.field("page_count").unwrap(), TagState::Value(json!(20)));
    }

    #[test]
    fn test_offsets_bounded_by_page_count() {
        let mut pdf = pdf();
        let err = pdf.set_field("numbers_offset", json!(21)).unwrap_err();
        assert_eq!(err.field(), "numbers_offset");
        pdf.set_field("roman_numbers_offset", json!(3)).unwrap();
    }

    #[test]
    fn test_future_date_rejected() {
        let mut pdf = pdf();
        assert!(matches!(
            pdf.set_field("date_published", json!("2999-01-01")),
            Err(ValidationError::FutureDate { .. })
        ));
    }

    #[test]
    fn test_update_validates_sub_records() {
        let mut pdf = pdf();
        let err = pdf
            .update(|fields| {
                fields.sections = Checked::Set(vec![Section::new(1), Section::new(30)]);
            })
            .unwrap_err();
        assert_eq!(err.field(), "sections[1].heading_page");
        assert_eq!(pdf.fields().sections, Checked::Unchecked);
    }

    #[test]
    fn test_duplicate_page_kind_rejected() {
        let mut pdf = pdf();
        let err = pdf
            .update(|fields| {
                fields.page_tags = Checked::Set(vec![
                    PageTag::unchecked(PageKind::Blank),
                    PageTag::unchecked(PageKind::Title),
                    PageTag::unchecked(PageKind::Blank),
                ]);
            })
            .unwrap_err();
        assert_eq!(err.field(), "page_tags[2].kind");
    }

    #[test]
    fn test_round_trip_fully_checked_record() {
        let mut original = pdf();
        original
            .update(|f| {
                f.url = Nullable::Null;
                f.authors = Checked::Set(vec!["Maskelyne, Nevil".to_string()]);
                f.editors = Checked::Set(vec![]);
                f.translators = Checked::Set(vec![]);
                f.date_published = Nullable::Set(NaiveDate::from_ymd_opt(1763, 1, 1).unwrap());
                f.publishing_frequency = Nullable::Set(PublishingFrequency::Once);
                f.title = Nullable::Set("The British Mariner's Guide".to_string());
                f.subtitle = Nullable::Null;
                f.long_title = Nullable::Null;
                f.edition = Nullable::Set(1);
                f.volume = Nullable::Null;
                f.in_copyright = Nullable::Set(false);
                f.copyright_years = Checked::Set(vec![]);
                f.publishers = Checked::Set(vec!["Nourse, John".to_string()]);
                f.publisher_cities = Checked::Set(vec!["London".to_string()]);
                f.printers = Checked::Set(vec![]);
                f.printing_number = Nullable::Null;
                f.numbers_offset = Nullable::Set(5);
                f.roman_numbers_offset = Nullable::Null;
                f.has_ligatures = Checked::Set(true);
                f.book_topics = Checked::Set(vec!["navigation".to_string()]);
                f.sections = Checked::Set(vec![Section::builder(5)
                    .with_kind(SectionKind::Chapter)
                    .with_number(1, NumberKind::Arabic)
                    .with_pages(5, 12)
                    .build(20)
                    .unwrap()]);
                f.graphics = Checked::Set(vec![Graphic::builder(13)
                    .with_kind(GraphicKind::Table)
                    .single_page()
                    .build(20)
                    .unwrap()]);
                f.page_tags = Checked::Set(vec![PageTag::new(PageKind::Blank, [2, 4], 20).unwrap()]);
            })
            .unwrap();

        let raw = original.serialize();
        assert!(raw.unchecked_tags.is_empty());
        let mut stored = raw.clone();
        stored.page_count = Some(20);
        let reloaded = Pdf::from_raw("book.pdf", &stored).unwrap();
        assert_eq!(reloaded, original);
        assert!(original.diff(&reloaded).is_empty());
    }

    #[test]
    fn test_load_precedence() {
        let raw = RawMetadata {
            values: json!({"Title": "X", "Url": "u", "Volume": 2})
                .as_object()
                .cloned()
                .unwrap(),
            null_tags: vec!["Title".to_string()],
            unchecked_tags: vec!["Url".to_string()],
            page_count: Some(4),
        };
        let pdf = Pdf::from_raw("book.pdf", &raw).unwrap();
        assert_eq!(pdf.fields().title, Nullable::Null);
        assert_eq!(pdf.fields().url, Nullable::Unchecked);
        assert_eq!(pdf.fields().volume, Nullable::Set(2));
        assert_eq!(pdf.fields().subtitle, Nullable::Unchecked);
    }

    #[test]
    fn test_missing_page_count() {
        let err = Pdf::from_raw("book.pdf", &RawMetadata::default()).unwrap_err();
        assert!(matches!(err, Error::MissingPageCount(_)));
    }

    #[test]
    fn test_diff_and_uncheck() {
        let mut a = pdf();
        a.set_field("title", json!("X")).unwrap();
        a.set_field("authors", json!(["A, B"])).unwrap();
        let mut b = a.clone();
        b.uncheck_field("title").unwrap();
        assert_eq!(a.diff(&b), vec!["title".to_string()]);
        b.set_field("authors", json!([])).unwrap();
        assert_eq!(a.diff(&b), vec!["authors".to_string(), "title".to_string()]);
    }
}

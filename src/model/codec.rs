//! Conversion between typed field values and raw JSON tag values.
//!
//! Decoding here is strict: it checks JSON shape and vocabulary membership
//! and applies the one normalization the schema defines (a bare year for a
//! date). Domain rules such as positivity and page bounds are checked
//! afterwards by the record validators.

use super::schema::{find_tag, to_camel, FieldSpec};
use super::value::{Checked, Nullable};
use super::vocab::{
    GraphicColor, GraphicContent, GraphicKind, NumberKind, PageKind, PublishingFrequency,
    SectionKind, UnknownTerm,
};
use crate::error::ValidationError;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

/// Key listing null fields inside a structured tag.
pub const NULL_FIELDS_KEY: &str = "NullFields";

/// Integer years accepted in place of a date.
const YEAR_RANGE: std::ops::RangeInclusive<i64> = 1000..=9999;

/// A value that can be stored in a metadata tag.
pub trait TagValue: Sized {
    /// Decode from a raw tag value. `field` is the path used in errors.
    fn from_tag(value: &Value, field: &str) -> Result<Self, ValidationError>;

    /// Encode into a raw tag value.
    fn to_tag(&self) -> Value;

    /// Whether this is an empty list (the confirmed-absent state of lists).
    fn is_empty_list(&self) -> bool {
        false
    }

    /// The empty list, for list types.
    fn empty_list() -> Option<Self> {
        None
    }
}

impl TagValue for String {
    fn from_tag(value: &Value, field: &str) -> Result<Self, ValidationError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(ValidationError::wrong_type(field, "text", other)),
        }
    }

    fn to_tag(&self) -> Value {
        Value::String(self.clone())
    }
}

impl TagValue for u32 {
    fn from_tag(value: &Value, field: &str) -> Result<Self, ValidationError> {
        if let Some(n) = value.as_u64() {
            return u32::try_from(n)
                .map_err(|_| ValidationError::wrong_type(field, "32-bit integer", value));
        }
        match value.as_i64() {
            Some(n) => Err(ValidationError::NotPositive {
                field: field.to_string(),
                value: n,
            }),
            None => Err(ValidationError::wrong_type(field, "integer", value)),
        }
    }

    fn to_tag(&self) -> Value {
        Value::from(*self)
    }
}

impl TagValue for bool {
    fn from_tag(value: &Value, field: &str) -> Result<Self, ValidationError> {
        value
            .as_bool()
            .ok_or_else(|| ValidationError::wrong_type(field, "boolean", value))
    }

    fn to_tag(&self) -> Value {
        Value::Bool(*self)
    }
}

impl TagValue for NaiveDate {
    /// Accepts `YYYY-MM-DD`, exiftool's `YYYY:MM:DD`, or a bare four-digit
    /// integer year which becomes January 1st of that year.
    fn from_tag(value: &Value, field: &str) -> Result<Self, ValidationError> {
        let invalid = |text: String| ValidationError::InvalidDate {
            field: field.to_string(),
            value: text,
        };
        match value {
            Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .or_else(|_| NaiveDate::parse_from_str(s, "%Y:%m:%d"))
                .map_err(|_| invalid(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .filter(|year| YEAR_RANGE.contains(year))
                .and_then(|year| NaiveDate::from_ymd_opt(year as i32, 1, 1))
                .ok_or_else(|| invalid(n.to_string())),
            other => Err(ValidationError::wrong_type(field, "date", other)),
        }
    }

    fn to_tag(&self) -> Value {
        Value::String(self.format("%Y-%m-%d").to_string())
    }
}

impl<T: TagValue> TagValue for Vec<T> {
    fn from_tag(value: &Value, field: &str) -> Result<Self, ValidationError> {
        match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| T::from_tag(item, &format!("{}[{}]", field, i)))
                .collect(),
            other => Err(ValidationError::wrong_type(field, "list", other)),
        }
    }

    fn to_tag(&self) -> Value {
        Value::Array(self.iter().map(TagValue::to_tag).collect())
    }

    fn is_empty_list(&self) -> bool {
        self.is_empty()
    }

    fn empty_list() -> Option<Self> {
        Some(Vec::new())
    }
}

impl<T: TagValue + Ord> TagValue for BTreeSet<T> {
    fn from_tag(value: &Value, field: &str) -> Result<Self, ValidationError> {
        Ok(Vec::<T>::from_tag(value, field)?.into_iter().collect())
    }

    fn to_tag(&self) -> Value {
        Value::Array(self.iter().map(TagValue::to_tag).collect())
    }

    fn is_empty_list(&self) -> bool {
        self.is_empty()
    }

    fn empty_list() -> Option<Self> {
        Some(BTreeSet::new())
    }
}

macro_rules! term_tag_value {
    ($($name:ty),+ $(,)?) => {
        $(
            impl TagValue for $name {
                fn from_tag(value: &Value, field: &str) -> Result<Self, ValidationError> {
                    match value {
                        Value::String(s) => s
                            .parse()
                            .map_err(|err: UnknownTerm| ValidationError::NotInVocabulary {
                                field: field.to_string(),
                                value: err.value,
                                allowed: err.allowed.join(", "),
                            }),
                        other => Err(ValidationError::wrong_type(field, "text", other)),
                    }
                }

                fn to_tag(&self) -> Value {
                    Value::String(self.as_str().to_string())
                }
            }
        )+
    };
}

term_tag_value!(
    SectionKind,
    NumberKind,
    PublishingFrequency,
    GraphicKind,
    GraphicContent,
    GraphicColor,
    PageKind,
);

/// Join a record path and a field name.
pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Reads typed fields out of a flat tag map plus its null/unchecked lists.
pub struct TagReader<'a> {
    values: &'a Map<String, Value>,
    null: HashSet<String>,
    unchecked: HashSet<String>,
    prefix: String,
}

impl<'a> TagReader<'a> {
    /// Reader over top-level document tags.
    pub fn new(
        values: &'a Map<String, Value>,
        null_tags: &[String],
        unchecked_tags: &[String],
    ) -> Self {
        Self {
            values,
            null: null_tags.iter().cloned().collect(),
            unchecked: unchecked_tags.iter().cloned().collect(),
            prefix: String::new(),
        }
    }

    /// Reader over one structured tag with the given fields. Absent fields
    /// read as unchecked; keys or `NullFields` entries naming no field are
    /// rejected.
    pub fn for_struct(
        value: &'a Value,
        field: &str,
        fields: &'static [FieldSpec],
    ) -> Result<Self, ValidationError> {
        let values = value
            .as_object()
            .ok_or_else(|| ValidationError::wrong_type(field, "structure", value))?;
        let null: HashSet<String> = match values.get(NULL_FIELDS_KEY) {
            None => HashSet::new(),
            Some(list) => Vec::<String>::from_tag(list, &join_path(field, NULL_FIELDS_KEY))?
                .into_iter()
                .collect(),
        };
        let known = |tag: &String| tag == NULL_FIELDS_KEY || find_tag(fields, tag).is_some();
        if let Some(tag) = values.keys().chain(null.iter()).find(|tag| !known(*tag)) {
            return Err(ValidationError::UnknownField(join_path(field, tag)));
        }
        Ok(Self {
            values,
            null,
            unchecked: HashSet::new(),
            prefix: field.to_string(),
        })
    }

    fn path(&self, name: &str) -> String {
        join_path(&self.prefix, name)
    }

    /// Unchecked wins over null, null wins over a stored value.
    fn raw(&self, name: &str) -> RawField<'a> {
        let tag = to_camel(name);
        if self.unchecked.contains(&tag) {
            RawField::Unchecked
        } else if self.null.contains(&tag) {
            RawField::Null
        } else {
            match self.values.get(&tag) {
                None => RawField::Unchecked,
                Some(Value::Null) => RawField::Null,
                Some(value) => RawField::Value(value),
            }
        }
    }

    /// Read a field that may be unchecked, null, or set.
    pub fn nullable<T: TagValue>(&self, name: &str) -> Result<Nullable<T>, ValidationError> {
        match self.raw(name) {
            RawField::Unchecked => Ok(Nullable::Unchecked),
            RawField::Null => Ok(Nullable::Null),
            RawField::Value(value) => Ok(Nullable::Set(T::from_tag(value, &self.path(name))?)),
        }
    }

    /// Read a field that may be unchecked or set. Null is only accepted
    /// for lists, where it means the empty list.
    pub fn checked<T: TagValue>(&self, name: &str) -> Result<Checked<T>, ValidationError> {
        match self.raw(name) {
            RawField::Unchecked => Ok(Checked::Unchecked),
            RawField::Null => T::empty_list().map(Checked::Set).ok_or_else(|| {
                ValidationError::NotNullable {
                    field: self.path(name),
                }
            }),
            RawField::Value(value) => Ok(Checked::Set(T::from_tag(value, &self.path(name))?)),
        }
    }

    /// Read a field that must hold a value.
    pub fn required<T: TagValue>(&self, name: &str) -> Result<T, ValidationError> {
        match self.raw(name) {
            RawField::Value(value) => T::from_tag(value, &self.path(name)),
            RawField::Unchecked | RawField::Null => Err(ValidationError::Missing {
                field: self.path(name),
            }),
        }
    }
}

enum RawField<'a> {
    Unchecked,
    Null,
    Value(&'a Value),
}

/// Collects typed fields into a flat tag map, sorting null and unchecked
/// fields into their lists.
#[derive(Debug, Default)]
pub struct TagWriter {
    values: Map<String, Value>,
    null: Vec<String>,
    unchecked: Vec<String>,
}

impl TagWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nullable<T: TagValue>(&mut self, name: &str, field: &Nullable<T>) {
        match field {
            Nullable::Unchecked => self.unchecked.push(to_camel(name)),
            Nullable::Null => self.null.push(to_camel(name)),
            Nullable::Set(value) => self.value(name, value),
        }
    }

    pub fn checked<T: TagValue>(&mut self, name: &str, field: &Checked<T>) {
        match field {
            Checked::Unchecked => self.unchecked.push(to_camel(name)),
            Checked::Set(value) => self.value(name, value),
        }
    }

    pub fn required<T: TagValue>(&mut self, name: &str, value: &T) {
        self.value(name, value);
    }

    fn value<T: TagValue>(&mut self, name: &str, value: &T) {
        if value.is_empty_list() {
            self.null.push(to_camel(name));
        } else {
            self.values.insert(to_camel(name), value.to_tag());
        }
    }

    /// Split into (values, null tags, unchecked tags).
    pub fn into_parts(self) -> (Map<String, Value>, Vec<String>, Vec<String>) {
        (self.values, self.null, self.unchecked)
    }

    /// Finish as a structured tag: unchecked fields are left out and null
    /// fields are listed under [`NULL_FIELDS_KEY`].
    pub fn into_struct(self) -> Value {
        let mut values = self.values;
        if !self.null.is_empty() {
            values.insert(
                NULL_FIELDS_KEY.to_string(),
                Value::Array(self.null.into_iter().map(Value::String).collect()),
            );
        }
        Value::Object(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::schema::SECTION_FIELDS;
    use serde_json::json;

    #[test]
    fn test_date_from_year() {
        let date = NaiveDate::from_tag(&json!(1763), "date_published").unwrap();
        assert_eq!(date.to_tag(), json!("1763-01-01"));
    }

    #[test]
    fn test_date_rejects_short_years() {
        for year in [json!(63), json!(0), json!(-44), json!(12345)] {
            assert!(matches!(
                NaiveDate::from_tag(&year, "date_published"),
                Err(ValidationError::InvalidDate { .. })
            ));
        }
        assert!(NaiveDate::from_tag(&json!(1000), "date_published").is_ok());
    }

    #[test]
    fn test_date_formats() {
        let iso = NaiveDate::from_tag(&json!("1763-05-02"), "d").unwrap();
        let exif = NaiveDate::from_tag(&json!("1763:05:02"), "d").unwrap();
        assert_eq!(iso, exif);
        assert!(matches!(
            NaiveDate::from_tag(&json!("May 1763"), "d"),
            Err(ValidationError::InvalidDate { .. })
        ));
        assert!(matches!(
            NaiveDate::from_tag(&json!([]), "d"),
            Err(ValidationError::WrongType { .. })
        ));
    }

    #[test]
    fn test_integer_decoding() {
        assert_eq!(u32::from_tag(&json!(4), "edition").unwrap(), 4);
        assert!(matches!(
            u32::from_tag(&json!(-1), "edition"),
            Err(ValidationError::NotPositive { value: -1, .. })
        ));
        assert!(matches!(
            u32::from_tag(&json!("4"), "edition"),
            Err(ValidationError::WrongType { .. })
        ));
        assert!(u32::from_tag(&json!(2.5), "edition").is_err());
    }

    #[test]
    fn test_list_rejects_scalar() {
        let err = Vec::<String>::from_tag(&json!("Maskelyne, Nevil"), "authors").unwrap_err();
        assert_eq!(err.field(), "authors");
        let err = Vec::<u32>::from_tag(&json!([1, "x"]), "copyright_years").unwrap_err();
        assert_eq!(err.field(), "copyright_years[1]");
    }

    #[test]
    fn test_vocabulary_decoding() {
        assert_eq!(
            NumberKind::from_tag(&json!("arabic"), "number_kind").unwrap(),
            NumberKind::Arabic
        );
        assert!(matches!(
            NumberKind::from_tag(&json!("test"), "number_kind"),
            Err(ValidationError::NotInVocabulary { .. })
        ));
    }

    #[test]
    fn test_reader_precedence() {
        let values = json!({"Title": "X", "Url": "u"});
        let values = values.as_object().unwrap();
        let null = vec!["Title".to_string()];
        let unchecked = vec!["Url".to_string()];
        let reader = TagReader::new(values, &null, &unchecked);
        assert_eq!(reader.nullable::<String>("title").unwrap(), Nullable::Null);
        assert_eq!(reader.nullable::<String>("url").unwrap(), Nullable::Unchecked);
        assert_eq!(
            reader.nullable::<String>("subtitle").unwrap(),
            Nullable::Unchecked
        );
    }

    #[test]
    fn test_reader_null_list_is_empty() {
        let values = Map::new();
        let null = vec!["Authors".to_string(), "HasLigatures".to_string()];
        let reader = TagReader::new(&values, &null, &[]);
        assert_eq!(
            reader.checked::<Vec<String>>("authors").unwrap(),
            Checked::Set(vec![])
        );
        assert!(matches!(
            reader.checked::<bool>("has_ligatures"),
            Err(ValidationError::NotNullable { .. })
        ));
    }

    #[test]
    fn test_writer_buckets() {
        let mut writer = TagWriter::new();
        writer.nullable("title", &Nullable::Set("X".to_string()));
        writer.nullable::<String>("url", &Nullable::Null);
        writer.checked::<Vec<String>>("authors", &Checked::Set(vec![]));
        writer.checked::<bool>("has_ligatures", &Checked::Unchecked);
        let (values, null, unchecked) = writer.into_parts();
        assert_eq!(values.get("Title"), Some(&json!("X")));
        assert_eq!(null, vec!["Url", "Authors"]);
        assert_eq!(unchecked, vec!["HasLigatures"]);
    }

    #[test]
    fn test_struct_round_trip() {
        let mut writer = TagWriter::new();
        writer.required("heading_page", &3u32);
        writer.nullable::<String>("title", &Nullable::Null);
        writer.checked::<u32>("first_page", &Checked::Unchecked);
        let value = writer.into_struct();
        assert_eq!(value, json!({"HeadingPage": 3, "NullFields": ["Title"]}));

        let reader = TagReader::for_struct(&value, "sections[0]", SECTION_FIELDS).unwrap();
        assert_eq!(reader.required::<u32>("heading_page").unwrap(), 3);
        assert_eq!(reader.nullable::<String>("title").unwrap(), Nullable::Null);
        assert_eq!(reader.checked::<u32>("first_page").unwrap(), Checked::Unchecked);
        let err = reader.required::<u32>("last_page").unwrap_err();
        assert_eq!(err.field(), "sections[0].last_page");
    }

    #[test]
    fn test_struct_rejects_unknown_keys() {
        let typo = json!({"HeadingPage": 2, "Titel": "x"});
        let err = TagReader::for_struct(&typo, "sections[0]", SECTION_FIELDS)
            .err()
            .unwrap();
        assert_eq!(err, ValidationError::UnknownField("sections[0].Titel".to_string()));

        let bogus = json!({"HeadingPage": 2, "NullFields": ["Bogus"]});
        let err = TagReader::for_struct(&bogus, "sections[1]", SECTION_FIELDS)
            .err()
            .unwrap();
        assert_eq!(err, ValidationError::UnknownField("sections[1].Bogus".to_string()));
    }
}

//! Flat tag representation exchanged with backends.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Tag listing the fields confirmed absent.
pub const NULL_TAGS: &str = "NullTags";
/// Tag listing the fields not yet reviewed.
pub const UNCHECKED_TAGS: &str = "UncheckedTags";

const PAGE_COUNT: &str = "PageCount";
const SOURCE_FILE: &str = "SourceFile";

/// Catalog tags of one file, keyed by CamelCase tag name without group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RawMetadata {
    /// Tags holding a value.
    pub values: Map<String, Value>,
    pub null_tags: Vec<String>,
    pub unchecked_tags: Vec<String>,
    /// Page count of the file; only ever read, never written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

/// State of a single tag.
#[derive(Debug, Clone, PartialEq)]
pub enum TagState {
    Unchecked,
    Null,
    Value(Value),
}

impl RawMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty metadata for a file with `page_count` pages.
    pub fn with_page_count(page_count: u32) -> Self {
        Self {
            page_count: Some(page_count),
            ..Self::default()
        }
    }

    /// Resolve a tag. The unchecked list wins over the null list, which
    /// wins over a stored value; a tag found nowhere is unchecked.
    pub fn state(&self, tag: &str) -> TagState {
        if self.unchecked_tags.iter().any(|t| t == tag) {
            TagState::Unchecked
        } else if self.null_tags.iter().any(|t| t == tag) {
            TagState::Null
        } else {
            match self.values.get(tag) {
                None => TagState::Unchecked,
                Some(Value::Null) => TagState::Null,
                Some(value) => TagState::Value(value.clone()),
            }
        }
    }

    pub fn set_value(&mut self, tag: &str, value: Value) {
        self.forget(tag);
        self.values.insert(tag.to_string(), value);
    }

    pub fn set_null(&mut self, tag: &str) {
        self.forget(tag);
        self.null_tags.push(tag.to_string());
    }

    pub fn set_unchecked(&mut self, tag: &str) {
        self.forget(tag);
        self.unchecked_tags.push(tag.to_string());
    }

    fn forget(&mut self, tag: &str) {
        self.values.remove(tag);
        self.null_tags.retain(|t| t != tag);
        self.unchecked_tags.retain(|t| t != tag);
    }

    /// Tags a write must clear: every null tag, then every unchecked tag.
    pub fn cleared_tags(&self) -> impl Iterator<Item = &str> {
        self.null_tags
            .iter()
            .chain(self.unchecked_tags.iter())
            .map(String::as_str)
    }

    /// Parse one record of the tool's JSON output.
    pub fn from_tool_record(record: Map<String, Value>) -> Result<Self> {
        let mut raw = Self::default();
        for (tag, value) in record {
            match tag.as_str() {
                SOURCE_FILE => {}
                PAGE_COUNT => {
                    let count = value
                        .as_u64()
                        .and_then(|n| u32::try_from(n).ok())
                        .ok_or_else(|| {
                            Error::ToolOutput(format!("{} is not a page count: {}", PAGE_COUNT, value))
                        })?;
                    raw.page_count = Some(count);
                }
                NULL_TAGS => raw.null_tags = tag_list(&tag, value)?,
                UNCHECKED_TAGS => raw.unchecked_tags = tag_list(&tag, value)?,
                _ => {
                    raw.values.insert(tag, value);
                }
            }
        }
        Ok(raw)
    }

    /// Build the JSON import record for `source_file`, prefixing every tag
    /// with `group`. Empty bookkeeping lists are left out.
    pub fn to_tool_record(&self, source_file: &Path, group: &str) -> Value {
        let mut record = Map::new();
        record.insert(
            SOURCE_FILE.to_string(),
            Value::String(source_file.display().to_string()),
        );
        for (tag, value) in &self.values {
            record.insert(format!("{}:{}", group, tag), value.clone());
        }
        for (tag, list) in [(NULL_TAGS, &self.null_tags), (UNCHECKED_TAGS, &self.unchecked_tags)] {
            if !list.is_empty() {
                record.insert(
                    format!("{}:{}", group, tag),
                    Value::Array(list.iter().cloned().map(Value::String).collect()),
                );
            }
        }
        Value::Object(record)
    }
}

fn tag_list(tag: &str, value: Value) -> Result<Vec<String>> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(Error::ToolOutput(format!("{} holds {}", tag, other))),
            })
            .collect(),
        other => Err(Error::ToolOutput(format!("{} is not a list: {}", tag, other))),
    }
}

//! Labelled groups of pages.

use super::codec::{join_path, TagReader, TagValue, TagWriter};
use super::rules;
use super::schema::PAGE_TAG_FIELDS;
use super::value::Checked;
use super::vocab::PageKind;
use crate::error::ValidationError;
use serde_json::Value;
use std::collections::BTreeSet;

/// A page kind and the pages that carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTag {
    pub kind: PageKind,
    pub pages: Checked<BTreeSet<u32>>,
}

impl PageTag {
    /// Create a validated tag for `pages` in a document with `page_count` pages.
    pub fn new<I>(kind: PageKind, pages: I, page_count: u32) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = u32>,
    {
        let tag = Self {
            kind,
            pages: Checked::Set(pages.into_iter().collect()),
        };
        tag.validate(page_count)?;
        Ok(tag)
    }

    /// A tag whose pages have not been reviewed yet.
    pub fn unchecked(kind: PageKind) -> Self {
        Self {
            kind,
            pages: Checked::Unchecked,
        }
    }

    /// Check the tag against a document with `page_count` pages.
    pub fn validate(&self, page_count: u32) -> Result<(), ValidationError> {
        self.validate_at("", page_count)
    }

    pub(crate) fn validate_at(&self, prefix: &str, page_count: u32) -> Result<(), ValidationError> {
        let field = join_path(prefix, "pages");
        if let Some(pages) = self.pages.value() {
            // sorted, so the first and last entries bound the rest
            if let Some(first) = pages.first() {
                rules::page(field.clone(), *first, page_count)?;
            }
            if let Some(last) = pages.last() {
                rules::page(field, *last, page_count)?;
            }
        }
        Ok(())
    }
}

impl TagValue for PageTag {
    fn from_tag(value: &Value, field: &str) -> Result<Self, ValidationError> {
        let r = TagReader::for_struct(value, field, PAGE_TAG_FIELDS)?;
        Ok(Self {
            kind: r.required("kind")?,
            pages: r.checked("pages")?,
        })
    }

    fn to_tag(&self) -> Value {
        let mut w = TagWriter::new();
        w.required("kind", &self.kind);
        w.checked("pages", &self.pages);
        w.into_struct()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_beyond_count_is_rejected() {
        let err = PageTag::new(PageKind::Blank, [1, 5, 20], 10).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::PageOutOfRange { page: 20, page_count: 10, .. }
        ));
    }

    #[test]
    fn test_pages_are_sorted_and_unique() {
        let tag = PageTag::new(PageKind::Title, [3, 1, 3], 10).unwrap();
        assert_eq!(tag.to_tag(), json!({"Kind": "title", "Pages": [1, 3]}));
    }

    #[test]
    fn test_empty_pages_are_null_fields() {
        let tag = PageTag::new(PageKind::EndPaper, Vec::new(), 10).unwrap();
        let value = tag.to_tag();
        assert_eq!(value, json!({"Kind": "end_paper", "NullFields": ["Pages"]}));
        assert_eq!(PageTag::from_tag(&value, "page_tags[0]").unwrap(), tag);
    }

    #[test]
    fn test_unchecked_pages_are_omitted() {
        let tag = PageTag::unchecked(PageKind::Blank);
        assert_eq!(tag.to_tag(), json!({"Kind": "blank"}));
        assert!(tag.validate(1).is_ok());
    }

    #[test]
    fn test_page_zero_is_rejected() {
        assert!(PageTag::new(PageKind::Blank, [0, 2], 10).is_err());
    }
}

//! Field and cross-field rules shared by all record validators.

use super::codec::join_path;
use super::value::{Checked, Nullable};
use crate::error::ValidationError;
use chrono::{Local, NaiveDate};

pub(crate) fn non_blank(field: String, text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

pub(crate) fn positive(field: String, value: u32) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::NotPositive { field, value: 0 });
    }
    Ok(())
}

/// Page numbers are 1-based and bounded by the page count.
pub(crate) fn page(field: String, value: u32, page_count: u32) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::NotPositive { field, value: 0 });
    }
    if value > page_count {
        return Err(ValidationError::PageOutOfRange {
            field,
            page: value,
            page_count,
        });
    }
    Ok(())
}

/// `lower <= upper`, skipped unless both sides hold values.
pub(crate) fn ordered(
    prefix: &str,
    lower: (&str, Option<u32>),
    upper: (&str, Option<u32>),
) -> Result<(), ValidationError> {
    if let ((lower_name, Some(lower_value)), (upper_name, Some(upper_value))) = (lower, upper) {
        if lower_value > upper_value {
            return Err(ValidationError::OutOfOrder {
                lower: join_path(prefix, lower_name),
                lower_value,
                upper: join_path(prefix, upper_name),
                upper_value,
            });
        }
    }
    Ok(())
}

pub(crate) fn not_future(field: String, date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Local::now().date_naive() {
        return Err(ValidationError::FutureDate {
            field,
            value: date.format("%Y-%m-%d").to_string(),
        });
    }
    Ok(())
}

pub(crate) fn text(prefix: &str, name: &str, field: &Nullable<String>) -> Result<(), ValidationError> {
    match field.value() {
        Some(value) => non_blank(join_path(prefix, name), value),
        None => Ok(()),
    }
}

pub(crate) fn checked_text(
    prefix: &str,
    name: &str,
    field: &Checked<String>,
) -> Result<(), ValidationError> {
    match field.value() {
        Some(value) => non_blank(join_path(prefix, name), value),
        None => Ok(()),
    }
}

pub(crate) fn names(
    prefix: &str,
    name: &str,
    field: &Checked<Vec<String>>,
) -> Result<(), ValidationError> {
    for (i, item) in field.iter().enumerate() {
        non_blank(format!("{}[{}]", join_path(prefix, name), i), item)?;
    }
    Ok(())
}

pub(crate) fn number(prefix: &str, name: &str, field: &Nullable<u32>) -> Result<(), ValidationError> {
    match field.value() {
        Some(value) => positive(join_path(prefix, name), *value),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        assert!(page("p".to_string(), 1, 1).is_ok());
        assert!(matches!(
            page("p".to_string(), 0, 10),
            Err(ValidationError::NotPositive { .. })
        ));
        assert!(matches!(
            page("p".to_string(), 11, 10),
            Err(ValidationError::PageOutOfRange { page: 11, page_count: 10, .. })
        ));
    }

    #[test]
    fn test_ordered_skips_unchecked() {
        assert!(ordered("", ("first_page", None), ("last_page", Some(1))).is_ok());
        assert!(ordered("", ("first_page", Some(2)), ("last_page", None)).is_ok());
        let err = ordered("sections[0]", ("first_page", Some(2)), ("last_page", Some(1)))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "sections[0].first_page (2) must not be greater than sections[0].last_page (1)"
        );
    }

    #[test]
    fn test_blank_text() {
        assert!(non_blank("title".to_string(), "  ").is_err());
        assert!(non_blank("title".to_string(), "Guide").is_ok());
        assert!(text("", "title", &Nullable::Null).is_ok());
    }

    #[test]
    fn test_future_date() {
        let next_century = NaiveDate::from_ymd_opt(2999, 1, 1).unwrap();
        assert!(not_future("date_published".to_string(), &next_century).is_err());
        let past = NaiveDate::from_ymd_opt(1763, 1, 1).unwrap();
        assert!(not_future("date_published".to_string(), &past).is_ok());
    }
}

//! Error types for smcmeta library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for smcmeta operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A field or cross-field rule rejected a value.
///
/// Every variant names the field path it applies to, using dotted paths with
/// list indices for nested records (`sections[1].heading_page`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The value has the wrong JSON type for the field.
    #[error("{field}: expected {expected}, found {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: String,
    },

    /// Text fields must not be empty or whitespace.
    #[error("{field}: must not be blank")]
    Blank { field: String },

    /// Numbers must be positive integers.
    #[error("{field}: must be a positive integer, found {value}")]
    NotPositive { field: String, value: i64 },

    /// Value is not part of the field's vocabulary.
    #[error("{field}: '{value}' is not one of: {allowed}")]
    NotInVocabulary {
        field: String,
        value: String,
        allowed: String,
    },

    /// Null was given for a field that cannot be confirmed absent.
    #[error("{field}: cannot be null")]
    NotNullable { field: String },

    /// A required field is missing or unchecked.
    #[error("{field}: is required")]
    Missing { field: String },

    /// A page number is larger than the document's page count.
    #[error("{field}: page {page} exceeds page count {page_count}")]
    PageOutOfRange {
        field: String,
        page: u32,
        page_count: u32,
    },

    /// Two related fields are in the wrong order.
    #[error("{lower} ({lower_value}) must not be greater than {upper} ({upper_value})")]
    OutOfOrder {
        lower: String,
        lower_value: u32,
        upper: String,
        upper_value: u32,
    },

    /// Dates could not be parsed.
    #[error("{field}: '{value}' is not a YYYY-MM-DD date or a year")]
    InvalidDate { field: String, value: String },

    /// Publication dates cannot lie in the future.
    #[error("{field}: {value} is in the future")]
    FutureDate { field: String, value: String },

    /// The same page kind was tagged twice.
    #[error("{field}: page kind '{kind}' is tagged more than once")]
    DuplicatePageKind { field: String, kind: String },

    /// No field with this name exists.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// The field is structural and cannot be edited.
    #[error("{0} is read-only")]
    ReadOnly(String),
}

impl ValidationError {
    /// Build a wrong-type error from the offending JSON value.
    pub fn wrong_type(field: &str, expected: &'static str, found: &serde_json::Value) -> Self {
        ValidationError::WrongType {
            field: field.to_string(),
            expected,
            found: json_kind(found).to_string(),
        }
    }

    /// The field path (or field pair) this error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::WrongType { field, .. }
            | ValidationError::Blank { field }
            | ValidationError::NotPositive { field, .. }
            | ValidationError::NotInVocabulary { field, .. }
            | ValidationError::NotNullable { field }
            | ValidationError::Missing { field }
            | ValidationError::PageOutOfRange { field, .. }
            | ValidationError::InvalidDate { field, .. }
            | ValidationError::FutureDate { field, .. }
            | ValidationError::DuplicatePageKind { field, .. } => field,
            ValidationError::OutOfOrder { upper, .. } => upper,
            ValidationError::UnknownField(field) | ValidationError::ReadOnly(field) => field,
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}

/// Why post-write verification refused to commit.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoundTripFailure {
    /// The rewritten file no longer parses into a valid document.
    #[error("written metadata cannot be read back: {0}")]
    Unparsable(String),

    /// The rewritten file parses but differs in these fields.
    #[error("written metadata differs in: {}", fields.join(", "))]
    Mismatch { fields: Vec<String> },
}

/// Error types that can occur while loading or writing metadata.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A field rule was violated.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The metadata tool failed, warned, or updated nothing.
    #[error("exiftool exited with status {status:?}: {stderr}")]
    ExternalTool { status: Option<i32>, stderr: String },

    /// The metadata tool produced output we could not interpret.
    #[error("Unexpected tool output: {0}")]
    ToolOutput(String),

    /// The file reports no page count.
    #[error("No page count found in {0}")]
    MissingPageCount(PathBuf),

    /// Verification failed; the file was restored from its backup.
    #[error("Metadata was rolled back: {0}")]
    RoundTrip(RoundTripFailure),

    /// Verification failed and the backup could not be put back.
    #[error("Could not restore {path} from backup: {reason}")]
    RestoreFailed { path: PathBuf, reason: String },
}

//! Metadata backend that shells out to exiftool.

use super::options::ExifToolOptions;
use super::raw::{RawMetadata, NULL_TAGS, UNCHECKED_TAGS};
use super::{with_suffix, MetadataBackend};
use crate::error::{Error, Result};
use crate::model::schema::{find_tag, FieldSpec, Shape, PDF_FIELDS};
use crate::model::NULL_FIELDS_KEY;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// [`MetadataBackend`] backed by the `exiftool` command line program.
#[derive(Debug, Clone, Default)]
pub struct ExifToolBackend {
    options: ExifToolOptions,
}

impl ExifToolBackend {
    /// Backend with default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExifToolOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ExifToolOptions {
        &self.options
    }

    /// Rebuild the XMP block of `path` from its own tags. Fixes files whose
    /// XMP packet exiftool refuses to update in place.
    pub fn repair_xmp(&self, path: &Path) -> Result<()> {
        let mut command = self.command();
        command
            .arg("-xmp:all=")
            .arg("-tagsfromfile")
            .arg("@")
            .arg("-xmp:all")
            .arg(path);
        self.run(command)?;
        Ok(())
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.options.program);
        command.arg("-config").arg(&self.options.config);
        command
    }

    fn run(&self, mut command: Command) -> Result<String> {
        debug!("Running {:?}", command);
        let output = command.output().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Failed to execute {}: {}", self.options.program.display(), e),
            )
        })?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        check_output(output.status.code(), &stdout, &stderr)?;
        Ok(stdout)
    }
}

impl MetadataBackend for ExifToolBackend {
    fn read(&self, path: &Path) -> Result<RawMetadata> {
        let mut command = self.command();
        command
            .arg("-j")
            .arg("-struct")
            .arg(format!("-{}:all", self.options.group))
            .arg("-PageCount")
            .arg(path);
        let stdout = self.run(command)?;

        let records: Vec<Map<String, Value>> = serde_json::from_str(&stdout)
            .map_err(|e| Error::ToolOutput(format!("invalid JSON from exiftool: {}", e)))?;
        let mut record = records
            .into_iter()
            .next()
            .ok_or_else(|| Error::ToolOutput(format!("no record for {}", path.display())))?;
        normalize_fields(&mut record, PDF_FIELDS);
        RawMetadata::from_tool_record(record)
    }

    fn write(&self, path: &Path, raw: &RawMetadata) -> Result<()> {
        let group = &self.options.group;
        let mut payload = tempfile::Builder::new()
            .prefix(".smcmeta-")
            .suffix(".json")
            .tempfile()?;
        serde_json::to_writer(&mut payload, &raw.to_tool_record(path, group))?;
        payload.flush()?;

        let mut command = self.command();
        command.arg(format!("-json={}", payload.path().display()));
        for tag in raw.cleared_tags() {
            command.arg(format!("-{}:{}=", group, tag));
        }
        // stale bookkeeping lists must not survive a write
        if raw.null_tags.is_empty() {
            command.arg(format!("-{}:{}=", group, NULL_TAGS));
        }
        if raw.unchecked_tags.is_empty() {
            command.arg(format!("-{}:{}=", group, UNCHECKED_TAGS));
        }
        command.arg(path);
        self.run(command)?;
        Ok(())
    }

    fn backup_path(&self, path: &Path) -> PathBuf {
        with_suffix(path, &self.options.backup_suffix)
    }
}

static ZERO_UPDATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b0 image files updated").expect("zero-updated pattern is valid"));
static UNCHANGED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[1-9]\d* image files unchanged").expect("unchanged pattern is valid")
});

/// Decide whether an exiftool run failed.
///
/// A run fails when it exits non-zero, prints a warning, or reports that it
/// updated nothing. A report of unchanged files is not a failure: writing
/// tags identical to the stored ones leaves the file as it is.
pub fn check_output(status: Option<i32>, stdout: &str, stderr: &str) -> Result<()> {
    if status != Some(0) || stderr.contains("Warning") {
        return Err(Error::ExternalTool {
            status,
            stderr: stderr.trim().to_string(),
        });
    }

    if ZERO_UPDATED.is_match(stdout) && !UNCHANGED.is_match(stdout) {
        return Err(Error::ExternalTool {
            status,
            stderr: format!("{} {}", stdout.trim(), stderr.trim()).trim().to_string(),
        });
    }
    Ok(())
}

/// Undo exiftool's JSON quirks for the fields of one record: single list
/// items come back as scalars, booleans as "True"/"False", and numeric
/// text as numbers (or the other way round).
fn normalize_fields(record: &mut Map<String, Value>, fields: &'static [FieldSpec]) {
    for (tag, value) in record.iter_mut() {
        if tag == NULL_TAGS || tag == UNCHECKED_TAGS || tag == NULL_FIELDS_KEY {
            wrap_list(value);
            continue;
        }
        if let Some(spec) = find_tag(fields, tag) {
            if spec.is_list() {
                wrap_list(value);
                if let Value::Array(items) = value {
                    for item in items.iter_mut() {
                        normalize_item(item, spec.shape);
                    }
                }
            } else {
                normalize_item(value, spec.shape);
            }
        }
    }
}

fn normalize_item(value: &mut Value, shape: Shape) {
    let replacement = match (shape, &*value) {
        (Shape::Boolean, Value::String(s)) => match s.as_str() {
            "True" | "true" => Some(Value::Bool(true)),
            "False" | "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (Shape::Integer | Shape::Page, Value::String(s)) => {
            s.trim().parse::<u64>().ok().map(Value::from)
        }
        (Shape::Text | Shape::Vocabulary(_), Value::Number(n)) => {
            Some(Value::String(n.to_string()))
        }
        _ => None,
    };
    if let Some(replacement) = replacement {
        *value = replacement;
        return;
    }
    if let (Shape::Struct(_, fields), Value::Object(object)) = (shape, value) {
        normalize_fields(object, fields);
    }
}

fn wrap_list(value: &mut Value) {
    if !value.is_array() {
        *value = Value::Array(vec![value.take()]);
    }
}

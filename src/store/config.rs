//! Generates the exiftool user config that defines the catalog namespace.

use super::raw::{NULL_TAGS, UNCHECKED_TAGS};
use crate::model::schema::{FieldSpec, Shape, PDF_FIELDS};
use crate::model::NULL_FIELDS_KEY;

/// XMP namespace URI of the catalog tags.
pub const NAMESPACE_URI: &str = "http://scienceandmaterialculture.org/ns/1.0/";

/// Render a `.ExifTool_config` declaring every catalog tag under `group`
/// (for example `XMP-smc`).
pub fn render_config(group: &str) -> String {
    let prefix = group.strip_prefix("XMP-").unwrap_or(group);
    let table = format!("Image::ExifTool::UserDefined::{}", prefix);

    let mut out = String::new();
    out.push_str("%Image::ExifTool::UserDefined = (\n");
    out.push_str("    'Image::ExifTool::XMP::Main' => {\n");
    out.push_str(&format!("        {} => {{\n", prefix));
    out.push_str(&format!(
        "            SubDirectory => {{ TagTable => '{}' }},\n",
        table
    ));
    out.push_str("        },\n    },\n);\n\n");

    out.push_str(&format!("%{} = (\n", table));
    out.push_str(&format!(
        "    GROUPS => {{ 0 => 'XMP', 1 => '{}', 2 => 'Document' }},\n",
        group
    ));
    out.push_str(&format!(
        "    NAMESPACE => {{ '{}' => '{}' }},\n",
        prefix, NAMESPACE_URI
    ));
    out.push_str("    WRITABLE => 'string',\n");
    for spec in PDF_FIELDS {
        out.push_str(&tag_line(spec));
    }
    out.push_str(&format!("    {} => {{ List => 'Bag' }},\n", NULL_TAGS));
    out.push_str(&format!("    {} => {{ List => 'Bag' }},\n", UNCHECKED_TAGS));
    out.push_str(");\n");

    for (name, fields) in structs(PDF_FIELDS) {
        out.push_str(&format!("\n%Image::ExifTool::UserDefined::{} = (\n", name));
        out.push_str(&format!("    STRUCT_NAME => '{}',\n", name));
        out.push_str(&format!("    NAMESPACE => '{}',\n", prefix));
        for spec in fields {
            out.push_str(&tag_line(spec));
        }
        out.push_str(&format!("    {} => {{ List => 'Bag' }},\n", NULL_FIELDS_KEY));
        out.push_str(");\n");
    }

    out.push_str("\n1;  # end\n");
    out
}

fn tag_line(spec: &FieldSpec) -> String {
    let mut attrs = Vec::new();
    match spec.shape {
        Shape::Integer | Shape::Page => attrs.push("Writable => 'integer'".to_string()),
        Shape::Boolean => attrs.push("Writable => 'boolean'".to_string()),
        Shape::Struct(name, _) => {
            attrs.push(format!("Struct => \\%Image::ExifTool::UserDefined::{}", name))
        }
        Shape::Text | Shape::Date | Shape::Vocabulary(_) => {}
    }
    if spec.is_list() {
        attrs.push("List => 'Seq'".to_string());
    }
    if attrs.is_empty() {
        return format!("    {} => {{ }},\n", spec.tag());
    }
    format!("    {} => {{ {} }},\n", spec.tag(), attrs.join(", "))
}

/// Every structure reachable from `fields`, first use first.
fn structs(fields: &'static [FieldSpec]) -> Vec<(&'static str, &'static [FieldSpec])> {
    let mut found: Vec<(&'static str, &'static [FieldSpec])> = Vec::new();
    for spec in fields {
        if let Shape::Struct(name, nested) = spec.shape {
            if found.iter().all(|(known, _)| *known != name) {
                found.push((name, nested));
                for inner in structs(nested) {
                    if found.iter().all(|(known, _)| *known != inner.0) {
                        found.push(inner);
                    }
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_declares_namespace_and_tags() {
        let config = render_config("XMP-smc");
        assert!(config.contains("TagTable => 'Image::ExifTool::UserDefined::smc'"));
        assert!(config.contains(&format!("NAMESPACE => {{ 'smc' => '{}' }}", NAMESPACE_URI)));
        assert!(config.contains("    Authors => { List => 'Seq' },\n"));
        assert!(config.contains("    Edition => { Writable => 'integer' },\n"));
        assert!(config.contains("    HasLigatures => { Writable => 'boolean' },\n"));
        assert!(config.contains("    Title => { },\n"));
        assert!(config.contains("    NullTags => { List => 'Bag' },\n"));
        assert!(config.trim_end().ends_with("1;  # end"));
    }

    #[test]
    fn test_config_declares_structures() {
        let config = render_config("XMP-smc");
        assert!(config.contains(
            "    Sections => { Struct => \\%Image::ExifTool::UserDefined::Section, List => 'Seq' },\n"
        ));
        for name in ["Section", "Graphic", "PageTag"] {
            assert!(config.contains(&format!("STRUCT_NAME => '{}'", name)));
        }
        assert!(config.contains("    HeadingPage => { Writable => 'integer' },\n"));
        assert!(config.contains("    Pages => { Writable => 'integer', List => 'Seq' },\n"));
        assert_eq!(config.matches("NullFields => { List => 'Bag' }").count(), 3);
    }
}

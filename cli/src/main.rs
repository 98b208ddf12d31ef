//! smcmeta CLI - review and correct catalog metadata of scanned books

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use log::debug;
use serde_json::Value;

use smcmeta::model::schema::{find_field, Presence, Shape, PDF_FIELDS};
use smcmeta::{render_config, ExifToolBackend, ExifToolOptions, Pdf, TagState};

#[derive(Parser)]
#[command(name = "smcmeta")]
#[command(author = "Science and Material Culture")]
#[command(version)]
#[command(about = "Review and correct the XMP catalog metadata of scanned books", long_about = None)]
struct Cli {
    /// exiftool executable
    #[arg(long, global = true, env = "SMC_EXIFTOOL", value_name = "PROGRAM")]
    exiftool: Option<PathBuf>,

    /// exiftool user config defining the catalog namespace
    #[arg(long, global = true, env = "SMC_EXIFTOOL_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every field of a PDF
    Show {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only list fields nobody has reviewed
        #[arg(long)]
        unchecked: bool,
    },

    /// Print one field as JSON
    Get {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Field name (snake_case)
        field: String,
    },

    /// Set a field and write it back
    Set {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Field name (snake_case)
        field: String,

        /// New value as JSON; anything that is not JSON is taken as text,
        /// and so are numbers and booleans given for a text field
        value: String,
    },

    /// Mark a field as confirmed empty
    Clear {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Field name (snake_case)
        field: String,
    },

    /// Mark a field as not yet reviewed
    Uncheck {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Field name (snake_case)
        field: String,
    },

    /// List the editable fields
    Fields,

    /// Print the exiftool config for the catalog namespace
    Config {
        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rebuild the XMP block of a PDF
    Repair {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let mut options = ExifToolOptions::new();
    if let Some(program) = cli.exiftool {
        options = options.with_program(program);
    }
    if let Some(config) = cli.config {
        options = options.with_config(config);
    }
    let backend = ExifToolBackend::with_options(options);

    let result = match cli.command {
        Commands::Show { input, unchecked } => cmd_show(&backend, &input, unchecked),
        Commands::Get { input, field } => cmd_get(&backend, &input, &field),
        Commands::Set {
            input,
            field,
            value,
        } => cmd_edit(&backend, &input, |pdf| {
            pdf.set_field(&field, parse_value(&field, &value))
        }),
        Commands::Clear { input, field } => {
            cmd_edit(&backend, &input, |pdf| pdf.set_field(&field, Value::Null))
        }
        Commands::Uncheck { input, field } => {
            cmd_edit(&backend, &input, |pdf| pdf.uncheck_field(&field))
        }
        Commands::Fields => {
            cmd_fields();
            Ok(())
        }
        Commands::Config { output } => cmd_config(&backend, output.as_deref()),
        Commands::Repair { input } => cmd_repair(&backend, &input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_show(backend: &ExifToolBackend, input: &Path, unchecked_only: bool) -> CliResult {
    let pdf = Pdf::load(backend, input)?;

    if unchecked_only {
        for name in pdf.unchecked_fields() {
            println!("{}", name);
        }
        return Ok(());
    }

    println!("{}", "Catalog Metadata".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), pdf.page_count());
    println!();

    for spec in PDF_FIELDS {
        let state = pdf.field(spec.name)?;
        println!("{}: {}", spec.name.bold(), render_state(&state));
    }
    Ok(())
}

fn cmd_get(backend: &ExifToolBackend, input: &Path, field: &str) -> CliResult {
    let pdf = Pdf::load(backend, input)?;
    match pdf.field(field)? {
        TagState::Value(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        other => println!("{}", render_state(&other)),
    }
    Ok(())
}

fn cmd_edit<F, E>(backend: &ExifToolBackend, input: &Path, edit: F) -> CliResult
where
    F: FnOnce(&mut Pdf) -> Result<(), E>,
    E: std::error::Error + 'static,
{
    let mut pdf = Pdf::load(backend, input)?;
    let before = pdf.clone();
    edit(&mut pdf)?;
    debug!("Changed fields: {:?}", pdf.diff(&before));
    pdf.write(backend)?;
    println!("{} {}", "Updated".green(), input.display());
    Ok(())
}

fn cmd_fields() {
    for spec in PDF_FIELDS {
        let presence = match spec.presence {
            Presence::Nullable => "nullable",
            Presence::Checked => "checked",
            Presence::List => "list",
            Presence::Required => "required",
        };
        println!(
            "{} {} {}",
            format!("{:<22}", spec.name).bold(),
            format!("{:<10}", presence).dimmed(),
            spec.shape.describe()
        );
    }
}

fn cmd_config(backend: &ExifToolBackend, output: Option<&Path>) -> CliResult {
    let config = render_config(&backend.options().group);
    if let Some(path) = output {
        fs::write(path, &config)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", config);
    }
    Ok(())
}

fn cmd_repair(backend: &ExifToolBackend, input: &Path) -> CliResult {
    backend.repair_xmp(input)?;
    println!("{} {}", "Repaired".green(), input.display());
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "smcmeta".cyan().bold(), env!("CARGO_PKG_VERSION"));
}

fn render_state(state: &TagState) -> String {
    match state {
        TagState::Unchecked => "unchecked".dimmed().to_string(),
        TagState::Null => "null".yellow().to_string(),
        TagState::Value(value) => value.to_string(),
    }
}

/// JSON if it parses, plain text otherwise. Single text fields keep
/// numeric-looking input as text (`set book.pdf title 1984`).
fn parse_value(field: &str, text: &str) -> Value {
    let parsed = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
    let textual = find_field(PDF_FIELDS, field).is_some_and(|spec| {
        !spec.is_list() && matches!(spec.shape, Shape::Text | Shape::Vocabulary(_))
    });
    match parsed {
        Value::Number(_) | Value::Bool(_) if textual => Value::String(text.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("edition", "2"), json!(2));
        assert_eq!(parse_value("authors", r#"["A, B"]"#), json!(["A, B"]));
        assert_eq!(parse_value("title", "The Guide"), json!("The Guide"));
        assert_eq!(parse_value("title", "null"), Value::Null);
    }

    #[test]
    fn test_parse_value_keeps_text_fields_textual() {
        assert_eq!(parse_value("title", "1984"), json!("1984"));
        assert_eq!(parse_value("subtitle", "true"), json!("true"));
        assert_eq!(parse_value("date_published", "1763"), json!(1763));
        assert_eq!(parse_value("copyright_years", "[1763]"), json!([1763]));
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "smcmeta",
            "get",
            "book.pdf",
            "title",
            "--exiftool",
            "/usr/local/bin/exiftool",
        ]);
        assert_eq!(cli.exiftool, Some(PathBuf::from("/usr/local/bin/exiftool")));
        assert!(matches!(cli.command, Commands::Get { .. }));
    }

    #[test]
    fn test_config_written_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".ExifTool_config");
        cmd_config(&ExifToolBackend::new(), Some(&path)).unwrap();
        let config = fs::read_to_string(&path).unwrap();
        assert!(config.contains("STRUCT_NAME => 'Section'"));
    }
}

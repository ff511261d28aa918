//! Output formatting utilities.

use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use crate::config::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// A name and value row.
#[derive(Debug, Tabled, Serialize)]
pub struct Field {
    /// Field name.
    #[tabled(rename = "Name")]
    pub name: String,
    /// Field value.
    #[tabled(rename = "Value")]
    pub value: String,
}

impl Field {
    /// Creates a row.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Outputs name and value pairs as a table or a JSON object.
pub fn output_fields(fields: &[Field], format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Table => {
            if fields.is_empty() {
                info("No results found.");
            } else {
                let table = Table::new(fields).with(Style::rounded()).to_string();
                println!("{table}");
            }
        }
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = fields
                .iter()
                .map(|f| (f.name.clone(), serde_json::Value::String(f.value.clone())))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
    }
    Ok(())
}

//! Terminal rendering for command results.
//!
//! Status lines (`✓`, `⚠`, `✗`) go to stdout or stderr as appropriate;
//! data goes to stdout in the format chosen with `--format`.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// How command results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tables and plain lines
    #[default]
    Table,
    /// JSON, one document per result
    Json,
}

fn to_json<T: Serialize + ?Sized>(item: &T, pretty: bool, fallback: &str) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(item)
    } else {
        serde_json::to_string(item)
    };
    rendered.unwrap_or_else(|_| fallback.to_string())
}

/// Render rows as a table, or as a JSON array.
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(rows, true, "[]")),
        OutputFormat::Table if rows.is_empty() => println!("(nothing to show)"),
        OutputFormat::Table => println!("{}", Table::new(rows).with(Style::rounded())),
    }
}

/// Render one value: debug layout for tables, pretty JSON otherwise.
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{item:#?}"),
        OutputFormat::Json => println!("{}", to_json(item, true, "{}")),
    }
}

/// Render one streamed event: `text` for tables, compact JSON otherwise.
pub fn print_line<T: Serialize>(text: &str, item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{text}"),
        OutputFormat::Json => println!("{}", to_json(item, false, "{}")),
    }
}

pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

pub fn print_warning(msg: &str) {
    eprintln!("⚠ {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Indented `label: value` line under a status message.
pub fn print_kv(label: &str, value: &str) {
    println!("    {:<16} {value}", format!("{label}:"));
}

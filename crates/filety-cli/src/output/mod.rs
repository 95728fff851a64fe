//! Terminal output
//!
//! Command results are rendered as a table or as JSON on stdout. Progress
//! lines go to stderr so JSON output stays pipeable.

use clap::ValueEnum;
use serde::Serialize;
use tabled::{Table, Tabled};

/// How command results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Render a list of rows; an empty table becomes a short notice
pub fn render_rows<T>(rows: &[T], format: OutputFormat) -> anyhow::Result<String>
where
    T: Serialize + Tabled,
{
    Ok(match format {
        OutputFormat::Table if rows.is_empty() => "Nothing to show.".to_string(),
        OutputFormat::Table => Table::new(rows).to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(rows)?,
    })
}

/// Render one row; JSON output is an object, not a one-element array
pub fn render_row<T>(row: &T, format: OutputFormat) -> anyhow::Result<String>
where
    T: Serialize + Tabled,
{
    Ok(match format {
        OutputFormat::Table => Table::new([row]).to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(row)?,
    })
}

pub fn print_output<T>(rows: &[T], format: OutputFormat) -> anyhow::Result<()>
where
    T: Serialize + Tabled,
{
    println!("{}", render_rows(rows, format)?);
    Ok(())
}

pub fn print_single<T>(row: &T, format: OutputFormat) -> anyhow::Result<()>
where
    T: Serialize + Tabled,
{
    println!("{}", render_row(row, format)?);
    Ok(())
}

pub fn print_success(message: &str, quiet: bool) {
    if !quiet {
        println!("{}", colored::Colorize::green(message));
    }
}

pub fn print_error(message: &str) {
    eprintln!("{}", colored::Colorize::red(message));
}

pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        println!("{}", message);
    }
}

/// Status line on stderr, e.g. upload phases
pub fn print_progress(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", colored::Colorize::dimmed(message));
    }
}

/// Shorten text to `max` characters for table cells
pub fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max && !text.contains('\n') {
        return line.to_string();
    }
    let cut: String = line.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

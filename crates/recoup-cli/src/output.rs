//! Output renderers and formatting helpers for CLI commands.

use std::io::Write;

use anyhow::anyhow;
use serde::Serialize;
use serde_json::{Number, Value};
use unicode_width::UnicodeWidthStr;

use crate::client::{CliError, CliResult};

/// Printed instead of a table when a listing is empty.
pub(crate) const NO_RESULTS: &str = "No results.";

const COLUMN_GAP: &str = "  ";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl OutputFormat {
    pub(crate) const fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Table }
    }
}

/// One projected field of a table: the payload key and its header label.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Column {
    pub(crate) key: &'static str,
    pub(crate) label: &'static str,
}

impl Column {
    pub(crate) const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Write `value` as 2-space indented JSON.
pub(crate) fn print_json<T>(out: &mut dyn Write, value: &T) -> CliResult<()>
where
    T: Serialize + ?Sized,
{
    let text = format_json(value)?;
    write_line(out, &text)
}

pub(crate) fn format_json<T>(value: &T) -> CliResult<String>
where
    T: Serialize + ?Sized,
{
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

pub(crate) fn print_table(out: &mut dyn Write, rows: &[Value], columns: &[Column]) -> CliResult<()> {
    write_lines(out, &render_table(rows, columns))
}

/// Lay out `rows` under `columns`; every cell is left-aligned to its column width.
#[must_use]
pub(crate) fn render_table(rows: &[Value], columns: &[Column]) -> Vec<String> {
    if rows.is_empty() {
        return vec![NO_RESULTS.to_string()];
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| cell_text(row.get(column.key)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            cells
                .iter()
                .map(|row| row[index].width())
                .fold(column.label.width(), usize::max)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(join_padded(columns.iter().map(|column| column.label), &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join(COLUMN_GAP),
    );
    for row in &cells {
        lines.push(join_padded(row.iter().map(String::as_str), &widths));
    }
    lines
}

fn join_padded<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| pad_end(cell, *width))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP)
}

fn pad_end(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

/// Stringify a scalar for display; `null` and missing values render empty.
#[must_use]
pub(crate) fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => format_number(number),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| cell_text(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(object @ Value::Object(_)) => object.to_string(),
    }
}

/// Integral floats print without a fraction (`10.0` reads as `10`).
fn format_number(number: &Number) -> String {
    match number.as_f64() {
        Some(float)
            if number.is_f64() && float.is_finite() && float.fract() == 0.0 && float.abs() < 1e21 =>
        {
            format!("{float:.0}")
        }
        _ => number.to_string(),
    }
}

/// Write `Error: <message>` to standard error. The exit status is applied by the caller.
pub(crate) fn print_error(message: &str) {
    eprintln!("Error: {message}");
}

pub(crate) fn write_line(out: &mut dyn Write, line: &str) -> CliResult<()> {
    writeln!(out, "{line}").map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
}

pub(crate) fn write_lines(out: &mut dyn Write, lines: &[String]) -> CliResult<()> {
    for line in lines {
        write_line(out, line)?;
    }
    Ok(())
}

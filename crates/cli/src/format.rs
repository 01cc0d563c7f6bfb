//! Plain-text output rendering
//!
//! Basic column mapping only: rows of strings padded to the widest cell.
//! JSON output is pretty-printed serde_json.

use serde_json::Value;

/// Render rows as a padded plain-text table.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return "No data to display".to_string();
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut out = String::new();
    render_row(&mut out, &widths, headers.iter().map(|h| h.to_string()));
    render_row(
        &mut out,
        &widths,
        widths.iter().map(|w| "-".repeat(*w)),
    );
    for row in rows {
        render_row(&mut out, &widths, row.iter().cloned());
    }
    out
}

fn render_row(out: &mut String, widths: &[usize], cells: impl Iterator<Item = String>) {
    let line = cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Extract a display cell from a result row by JSON pointer, `-` when absent.
pub fn cell(row: &Value, pointer: &str) -> String {
    match row.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "-".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Format a micro-amount field (cost, bids) as currency units.
///
/// The REST API serializes int64 metrics as JSON strings; accept both.
pub fn money_cell(row: &Value, pointer: &str) -> String {
    let micros = match row.pointer(pointer) {
        Some(Value::String(s)) => s.parse::<i64>().ok(),
        Some(Value::Number(n)) => n.as_i64(),
        _ => None,
    };
    match micros {
        Some(micros) => format_micros(micros),
        None => "-".to_string(),
    }
}

/// Google Ads reports monetary amounts in micros (1/1,000,000 units).
pub fn format_micros(micros: i64) -> String {
    format!("{:.2}", micros as f64 / 1_000_000.0)
}

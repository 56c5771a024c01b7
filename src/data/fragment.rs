//! Reduction of raw provider results into bounded text fragments.
//!
//! Fragments end up inside the analysis prompt, so every rendering path caps
//! both row count and character count. All functions here are pure; the
//! aggregator decides what stands in for a `None`.

use serde_json::Value;

use super::series::{FragmentShape, RawResult, Record};

/// Hard cap on one fragment's size inside the prompt.
pub const MAX_FRAGMENT_CHARS: usize = 3_500;

/// Render one raw result through its series' shape.
///
/// Returns `None` when the result holds nothing renderable (no rows, or the
/// selected field is absent), so the caller can substitute a placeholder.
pub fn format_fragment(shape: &FragmentShape, raw: &RawResult) -> Option<String> {
    let text = match shape {
        FragmentShape::Table { max_rows } => {
            if raw.rows.is_empty() {
                return None;
            }
            render_table(&raw.rows, *max_rows)
        }
        FragmentShape::FirstRecord => render_record(raw.rows.first()?),
        FragmentShape::LastRecord => render_record(raw.rows.last()?),
        FragmentShape::LastField(field) => render_value(raw.rows.last()?.get(*field)?),
        FragmentShape::NameList { field, max } => render_name_list(&raw.rows, field, *max)?,
    };

    Some(clamp(text))
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// `column | column | ...` header plus one line per row, capped.
fn render_table(rows: &[Record], max_rows: usize) -> String {
    let shown = &rows[..rows.len().min(max_rows)];
    let columns: Vec<&str> = shown
        .first()
        .map(|row| row.keys().map(String::as_str).collect())
        .unwrap_or_default();

    let mut lines = Vec::with_capacity(shown.len() + 2);
    lines.push(columns.join(" | "));
    for row in shown {
        let cells: Vec<String> = columns
            .iter()
            .map(|col| row.get(*col).map(render_value).unwrap_or_else(|| "-".to_string()))
            .collect();
        lines.push(cells.join(" | "));
    }

    if rows.len() > max_rows {
        lines.push(format!("(... {} more rows)", rows.len() - max_rows));
    }

    lines.join("\n")
}

fn render_record(record: &Record) -> String {
    record
        .iter()
        .map(|(key, value)| format!("{}: {}", key, render_value(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_name_list(rows: &[Record], field: &str, max: usize) -> Option<String> {
    let names: Vec<String> = rows
        .iter()
        .filter_map(|row| row.get(field))
        .map(render_value)
        .collect();

    if names.is_empty() {
        return None;
    }

    let mut text = names[..names.len().min(max)].join(", ");
    if names.len() > max {
        text.push_str(&format!(" (... {} more)", names.len() - max));
    }
    Some(text)
}

/// Char-boundary-safe truncation to [`MAX_FRAGMENT_CHARS`].
fn clamp(text: String) -> String {
    if text.chars().count() <= MAX_FRAGMENT_CHARS {
        return text;
    }
    let cut: String = text.chars().take(MAX_FRAGMENT_CHARS).collect();
    format!("{cut} ...[truncated]")
}

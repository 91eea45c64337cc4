use std::borrow::Cow;

use itertools::Itertools;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::aggregator::ExportTable;

#[derive(Debug, Serialize)]
pub struct ExportJson {
    pub headers: Vec<String>,
    pub items: Vec<Map<String, Value>>,
    pub count: usize,
}

/// Keys each row by its header label. Columns sharing a label collapse to the
/// right-most one.
pub fn to_json(table: &ExportTable) -> ExportJson {
    let headers = table.headers();
    let items = table
        .rows
        .iter()
        .map(|row| headers.iter().cloned().zip(row.iter().map(|c| Value::String(c.clone()))).collect())
        .collect();
    ExportJson {
        headers,
        items,
        count: table.rows.len(),
    }
}

pub fn to_csv(table: &ExportTable) -> String {
    let mut out = String::new();
    for line in std::iter::once(table.headers()).chain(table.rows.iter().cloned()) {
        out.push_str(&line.iter().map(|f| escape_field(f)).join(","));
        out.push('\n');
    }
    out
}

/// Quotes a field when it holds a comma, quote or line break, doubling inner quotes.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

pub fn csv_filename(slug: &str) -> String {
    format!("{}-responses.csv", slug)
}

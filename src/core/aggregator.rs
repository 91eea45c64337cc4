//! Pivots stored answers into a column-ordered table.
//!
//! Schema questions come first, in schema order. Answer keys the schema does
//! not know about (renamed or deleted questions) are appended in the order
//! they are first seen, so no stored answer is ever dropped from an export.

use std::collections::HashSet;

use itertools::Itertools;
use serde_json::{Map, Value};

use crate::core::models::response::ResponseRecord;
use crate::core::normalizer::slugify;
use crate::error::Error;

pub const CREATED_AT_HEADER: &str = "created_at";
pub const IP_HEADER: &str = "ip";

/// How array answers are flattened into one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellStyle {
    Screen,
    File,
}

impl CellStyle {
    fn delimiter(&self) -> &'static str {
        match self {
            CellStyle::Screen => "; ",
            CellStyle::File => ", ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    CreatedAt,
    Ip,
    Answer(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub label: String,
    source: Source,
}

impl Column {
    /// The answer key this column reads, `None` for metadata columns.
    pub fn key(&self) -> Option<&str> {
        match &self.source {
            Source::Answer(key) => Some(key),
            _ => None,
        }
    }
}

/// Column list under construction. Header labels stay unique: a label that is
/// already taken gets `_2`, `_3`, ... so no column can shadow another by name.
#[derive(Default)]
struct Columns {
    columns: Vec<Column>,
    labels: HashSet<String>,
}

impl Columns {
    fn push(&mut self, label: String, source: Source) {
        let mut unique = label.clone();
        let mut n = 2;
        while !self.labels.insert(unique.clone()) {
            unique = format!("{}_{}", label, n);
            n += 1;
        }
        self.columns.push(Column { label: unique, source });
    }

    fn claims(&self, key: &str) -> bool {
        self.columns.iter().filter_map(Column::key).any(|k| k == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.label.clone()).collect()
    }
}

/// Builds the export table. Rows keep the order they are given in.
pub fn aggregate(schema: &Value, rows: &[ResponseRecord], style: CellStyle) -> Result<ExportTable, Error> {
    let mut columns = Columns::default();
    columns.push(CREATED_AT_HEADER.into(), Source::CreatedAt);
    columns.push(IP_HEADER.into(), Source::Ip);
    for (key, label) in schema_columns(schema)? {
        columns.push(label, Source::Answer(key));
    }

    let mut answers = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let map = match &row.answers {
            Value::Null => None,
            Value::Object(map) => Some(map),
            _ => return Err(Error::MalformedInput(format!("answers of response {} are not an object", i + 1))),
        };
        if let Some(map) = map {
            for key in map.keys() {
                if !columns.claims(key) {
                    columns.push(key.clone(), Source::Answer(key.clone()));
                }
            }
        }
        answers.push(map);
    }

    let columns = columns.columns;
    let rows = rows
        .iter()
        .zip(answers)
        .map(|(row, map)| columns.iter().map(|c| cell(row, map, c, style)).collect())
        .collect();
    Ok(ExportTable { columns, rows })
}

/// Key and label per schema question. The key is `id`, else `name`, else the
/// slugified label, else `q<i>`; a label-derived key never reuses an earlier key.
fn schema_columns(schema: &Value) -> Result<Vec<(String, String)>, Error> {
    let questions = match schema {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => match map.get("questions").or_else(|| map.get("fields")) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(Error::MalformedInput("schema questions must be an array".into())),
        },
        _ => return Err(Error::MalformedInput("schema must be an object".into())),
    };
    let mut out: Vec<(String, String)> = Vec::with_capacity(questions.len());
    for (i, q) in questions.iter().enumerate() {
        let q = q
            .as_object()
            .ok_or_else(|| Error::MalformedInput(format!("question {} is not an object", i + 1)))?;
        let label = q.get("label").and_then(key_text);
        let key = ["id", "name"]
            .iter()
            .find_map(|k| q.get(*k).and_then(key_text))
            .or_else(|| {
                label
                    .as_deref()
                    .map(slugify)
                    .filter(|k| !k.is_empty() && !out.iter().any(|(taken, _)| taken == k))
            })
            .unwrap_or_else(|| format!("q{}", i + 1));
        let label = label.unwrap_or_else(|| key.clone());
        out.push((key, label));
    }
    Ok(out)
}

fn key_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn cell(row: &ResponseRecord, answers: Option<&Map<String, Value>>, column: &Column, style: CellStyle) -> String {
    match &column.source {
        Source::CreatedAt => row.created_at.to_rfc3339(),
        Source::Ip => row.ip.clone().unwrap_or_default(),
        Source::Answer(key) => answers.and_then(|m| m.get(key)).map(|v| render(v, style)).unwrap_or_default(),
    }
}

fn render(value: &Value, style: CellStyle) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar).join(style.delimiter()),
        other => scalar(other),
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

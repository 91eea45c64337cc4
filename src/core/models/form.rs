use crate::core::models::question::Question;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Canonical form definition as produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FormSchema {
    pub title: String,
    pub description: String,
    pub active: bool,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upsert {
    pub slug: String,
    pub schema: FormSchema,
}

/// A form row as persisted. `schema` is kept as raw JSON: rows written by older
/// builds may not match the current canonical shape.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Form {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub active: bool,
    pub schema: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FormSummary {
    pub slug: String,
    pub title: String,
    pub active: bool,
    pub updated_at: DateTime<Utc>,
    pub response_count: i64,
}

/// What a respondent gets to see.
#[derive(Debug, Clone, Serialize)]
pub struct PublicForm {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Default)]
pub struct Query {
    pub active_eq: Option<bool>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// One respondent's submission as read back from storage.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResponseRecord {
    pub created_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub answers: Value,
}

#[derive(Debug, Deserialize)]
pub struct Submit {
    #[serde(default)]
    pub answers: Value,
}

#[derive(Debug, Clone)]
pub struct Insert {
    pub form_slug: String,
    pub ip: Option<String>,
    pub answers: Value,
}

pub struct Query {
    pub form_slug_eq: String,
    pub ip_eq: Option<String>,
}

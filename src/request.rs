use crate::serde::Deserialize;

fn first_page() -> i64 {
    1
}

fn default_size() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormFilter {
    pub active: Option<bool>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
pub struct ExportParam {
    #[serde(default)]
    pub format: ExportFormat,
}

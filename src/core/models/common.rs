#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn new(limit: i64, offset: Option<i64>) -> Self {
        Self {
            limit: limit.max(1),
            offset: offset.unwrap_or(0).max(0),
        }
    }

    /// Builds a pagination from 1-based page numbers as they arrive over HTTP.
    pub fn from_page(page: i64, size: i64) -> Self {
        let size = size.clamp(1, 100);
        Self::new(size, Some((page.max(1) - 1).saturating_mul(size)))
    }
}

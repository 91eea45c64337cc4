use crate::serde::Serialize;

/// One page of a listing together with the unpaged total.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    list: Vec<T>,
    total: i64,
    page: i64,
    size: i64,
}

impl<T> Page<T> {
    pub fn new(list: Vec<T>, total: i64, page: i64, size: i64) -> Self {
        Page { list, total, page, size }
    }
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub ok: bool,
}

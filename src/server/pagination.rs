use serde::Deserialize;

use super::deserializers::deserialize_lenient_i64;

pub const QUESTIONS_PER_PAGE: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    page: Option<i64>,
}

impl PageQuery {
    /// 1-indexed page number, 1 when absent.
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }
}

/// Slices `[(page - 1) * 10, page * 10)` out of `items`. Pages below 1 are empty.
pub fn paginate<T>(items: Vec<T>, page: i64) -> Vec<T> {
    let start = page
        .checked_sub(1)
        .and_then(|p| usize::try_from(p).ok())
        .and_then(|p| p.checked_mul(QUESTIONS_PER_PAGE));
    match start {
        Some(start) => items
            .into_iter()
            .skip(start)
            .take(QUESTIONS_PER_PAGE)
            .collect(),
        None => Vec::new(),
    }
}

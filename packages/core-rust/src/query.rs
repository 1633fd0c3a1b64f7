//! Typed result envelope for paged list endpoints.

use serde::{Deserialize, Serialize};

use crate::page::Page;

/// One page of items plus the pagination metadata a client needs to render
/// pagers. `total` comes from a separate COUNT query and may drift from
/// `items` under concurrent writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub rows_per_page: u32,
}

impl<T> QueryResult<T> {
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, page: Page) -> Self {
        Self {
            items,
            total,
            page: page.number(),
            rows_per_page: page.rows_per_page(),
        }
    }

    /// Converts each item, keeping the pagination metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> QueryResult<U> {
        QueryResult {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            rows_per_page: self.rows_per_page,
        }
    }
}

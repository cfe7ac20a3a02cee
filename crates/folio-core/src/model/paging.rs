use serde::{Deserialize, Serialize};

/// Largest page size a search query will honour
pub const MAX_PAGE_SIZE: u32 = 100;

/// 1-based paging parameters for search queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingParams {
    pub page_number: u32,
    pub page_size: u32,
}

impl Default for PagingParams {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 20,
        }
    }
}

impl PagingParams {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
        }
    }

    /// Clamp out-of-range values: page numbers start at 1, sizes to 1..=MAX_PAGE_SIZE
    pub fn normalized(self) -> Self {
        Self {
            page_number: self.page_number.max(1),
            page_size: self.page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Row offset for SQL `LIMIT ? OFFSET ?`
    pub fn offset(&self) -> i64 {
        let normalized = self.normalized();
        i64::from(normalized.page_number - 1) * i64::from(normalized.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.normalized().page_size)
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagedQueryResult<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub page_number: u32,
    pub page_size: u32,
    pub page_count: u32,
}

impl<T> PagedQueryResult<T> {
    pub fn new(items: Vec<T>, total_items: u64, params: PagingParams) -> Self {
        let params = params.normalized();
        let page_count = total_items.div_ceil(u64::from(params.page_size)) as u32;
        Self {
            items,
            total_items,
            page_number: params.page_number,
            page_size: params.page_size,
            page_count,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedQueryResult<U> {
        PagedQueryResult {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            page_number: self.page_number,
            page_size: self.page_size,
            page_count: self.page_count,
        }
    }
}

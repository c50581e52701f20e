//! Paging primitives for tenant-scoped listings

use serde::{Deserialize, Serialize};

/// Sort direction for paged listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// A request for one page of results
///
/// Page indexes are zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_index: u32,
    pub page_size: u32,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

impl PageRequest {
    /// Creates a request for the given page, sorted ascending
    pub fn new(page_index: u32, page_size: u32) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
            sort_direction: SortDirection::Ascending,
        }
    }

    /// The first page of the given size
    pub fn first(page_size: u32) -> Self {
        Self::new(0, page_size)
    }

    pub fn with_sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = direction;
        self
    }

    /// Caps the page size at `max_page_size`
    pub fn clamped(mut self, max_page_size: u32) -> Self {
        self.page_size = self.page_size.clamp(1, max_page_size.max(1));
        self
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page_index) * u64::from(self.page_size)
    }

    /// Number of rows to take
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }

    /// Slices an already-ordered, fully materialized result into a page
    pub fn paginate<T>(&self, items: Vec<T>) -> Page<T> {
        let total = items.len() as u64;
        let items = items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect();
        Page::new(items, total, *self)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(20)
    }
}

/// One page of results with the total across all pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page_index: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page_index: request.page_index,
            page_size: request.page_size,
        }
    }

    /// An empty page for the given request
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    /// Number of pages needed to hold `total` items
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Converts the items while keeping paging information
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page_index: self.page_index,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let request = PageRequest::new(3, 25);
        assert_eq!(request.offset(), 75);
        assert_eq!(request.limit(), 25);
    }

    #[test]
    fn test_clamped() {
        let request = PageRequest::new(0, 5000).clamped(100);
        assert_eq!(request.page_size, 100);
    }

    #[test]
    fn test_paginate() {
        let page = PageRequest::new(1, 2).paginate(vec![1, 2, 3, 4, 5]);
        assert_eq!(page.items, vec![3, 4]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages(), 3);
    }

    #[test]
    fn test_paginate_past_end() {
        let page = PageRequest::new(9, 10).paginate(vec!["a"]);
        assert!(page.is_empty());
        assert_eq!(page.total, 1);
    }
}

//! Pagination cursor and page-cache key.

use serde::{Deserialize, Serialize};

use crate::error::{PawError, Result};
use crate::search::filter::Filter;

/// 1-based page position. The offset is always derived from the page and the
/// current page size, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageCursor {
    page: u32,
}

impl PageCursor {
    pub const FIRST: PageCursor = PageCursor { page: 1 };

    pub fn new(page: u32) -> Result<Self> {
        if page == 0 {
            return Err(PawError::validation("page", "Page numbers start at 1"));
        }
        Ok(Self { page })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// `(page - 1) * page_size`
    pub fn offset(&self, page_size: u32) -> u64 {
        u64::from(self.page - 1) * u64::from(page_size)
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::FIRST
    }
}

/// The exact `(Filter, PageCursor)` tuple a search page was fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub filter: Filter,
    pub cursor: PageCursor,
}

impl PageKey {
    pub fn new(filter: Filter, cursor: PageCursor) -> Self {
        Self { filter, cursor }
    }

    pub fn offset(&self) -> u64 {
        self.cursor.offset(self.filter.page_size)
    }
}

/// Number of pages needed to show `total` results.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(page_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset() {
        assert_eq!(PageCursor::FIRST.offset(20), 0);
        assert_eq!(PageCursor::new(3).unwrap().offset(20), 40);
        assert_eq!(PageCursor::new(3).unwrap().offset(25), 50);
    }

    #[test]
    fn test_zero_page_rejected() {
        let err = PageCursor::new(0).unwrap_err();
        assert_eq!(err.field(), Some("page"));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(10_000, 25), 400);
    }

    #[test]
    fn test_page_key_equality_is_by_value() {
        let a = PageKey::new(Filter::default(), PageCursor::new(2).unwrap());
        let b = PageKey::new(Filter::default(), PageCursor::new(2).unwrap());
        assert_eq!(a, b);
        assert_eq!(a.offset(), 20);
    }
}

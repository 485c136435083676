//! Offset pagination.
//!
//! The user and product listings share the same pagination contract:
//! `page >= 1`, `page_size >= 1`, `skip = (page - 1) * page_size`, and
//! `total_pages = ceil(total_count / page_size)`.

use serde::Serialize;

/// Errors that can occur when building a [`PageRequest`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageError {
    /// The requested page number is zero.
    #[error("page must be a positive integer")]
    InvalidPage,
    /// The requested page size is zero.
    #[error("limit must be a positive integer")]
    InvalidPageSize,
}

/// A validated request for one page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    /// Page number used when the client omits `page`.
    pub const DEFAULT_PAGE: u64 = 1;
    /// Page size used when the client omits `limit`.
    pub const DEFAULT_PAGE_SIZE: u64 = 10;

    /// Create a page request from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if either value is zero.
    pub const fn new(page: u64, page_size: u64) -> Result<Self, PageError> {
        if page == 0 {
            return Err(PageError::InvalidPage);
        }
        if page_size == 0 {
            return Err(PageError::InvalidPageSize);
        }
        Ok(Self { page, page_size })
    }

    /// Create a page request from optional query parameters, applying the
    /// defaults `page=1` and `limit=10` for omitted values.
    ///
    /// # Errors
    ///
    /// Returns [`PageError`] if either supplied value is zero.
    pub const fn from_query(page: Option<u64>, page_size: Option<u64>) -> Result<Self, PageError> {
        let page = match page {
            Some(p) => p,
            None => Self::DEFAULT_PAGE,
        };
        let page_size = match page_size {
            Some(s) => s,
            None => Self::DEFAULT_PAGE_SIZE,
        };
        Self::new(page, page_size)
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(self) -> u64 {
        self.page
    }

    /// The maximum number of items on the page.
    #[must_use]
    pub const fn page_size(self) -> u64 {
        self.page_size
    }

    /// The number of items to skip: `(page - 1) * page_size`.
    #[must_use]
    pub const fn skip(self) -> u64 {
        (self.page - 1) * self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a listing, with page metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// The 1-based page number that was requested.
    pub current_page: u64,
    /// Total number of pages: `ceil(total_count / page_size)`.
    pub total_pages: u64,
    /// Total number of matching items across all pages.
    pub total_count: u64,
}

impl<T> Page<T> {
    /// Assemble a page from fetched items and the total matching count.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total_count: u64) -> Self {
        Self {
            items,
            current_page: request.page(),
            total_pages: total_count.div_ceil(request.page_size()),
            total_count,
        }
    }

    /// Map the items of the page, preserving the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_count: self.total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_values() {
        assert_eq!(PageRequest::new(0, 10), Err(PageError::InvalidPage));
        assert_eq!(PageRequest::new(1, 0), Err(PageError::InvalidPageSize));
        assert_eq!(
            PageRequest::from_query(Some(0), None),
            Err(PageError::InvalidPage)
        );
        assert_eq!(
            PageRequest::from_query(None, Some(0)),
            Err(PageError::InvalidPageSize)
        );
    }

    #[test]
    fn test_defaults() {
        let req = PageRequest::from_query(None, None).unwrap();
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), 10);
        assert_eq!(req.skip(), 0);
    }

    #[test]
    fn test_skip() {
        let req = PageRequest::new(3, 25).unwrap();
        assert_eq!(req.skip(), 50);
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        let req = PageRequest::new(1, 10).unwrap();
        assert_eq!(Page::<u32>::new(vec![], req, 0).total_pages, 0);
        assert_eq!(Page::<u32>::new(vec![], req, 1).total_pages, 1);
        assert_eq!(Page::<u32>::new(vec![], req, 10).total_pages, 1);
        assert_eq!(Page::<u32>::new(vec![], req, 11).total_pages, 2);
        assert_eq!(Page::<u32>::new(vec![], req, 15).total_pages, 2);
        assert_eq!(Page::<u32>::new(vec![], req, 100).total_pages, 10);
    }

    #[test]
    fn test_item_count_bound() {
        // The returned item count equals min(page_size, total - skip),
        // clamped to >= 0, for every (total, page, size) combination here.
        for total in [0_u64, 1, 9, 10, 11, 15, 42] {
            for page in 1..=6 {
                for size in [1_u64, 3, 10] {
                    let req = PageRequest::new(page, size).unwrap();
                    let expected = total.saturating_sub(req.skip()).min(size);
                    let items: Vec<u64> = (0..total).skip(req.skip() as usize)
                        .take(size as usize)
                        .collect();
                    let page = Page::new(items, req, total);
                    assert_eq!(page.items.len() as u64, expected);
                    assert_eq!(page.total_pages, total.div_ceil(size));
                }
            }
        }
    }

    #[test]
    fn test_map_preserves_metadata() {
        let req = PageRequest::new(2, 5).unwrap();
        let page = Page::new(vec![1, 2, 3], req, 13).map(|n| n * 2);
        assert_eq!(page.items, vec![2, 4, 6]);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_count, 13);
    }
}

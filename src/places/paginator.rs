//! Page arithmetic for listings.
//!
//! ```text
//! last_page = ceil(total / page_size)      (0 when total == 0)
//! valid     = 1 <= page <= last_page
//! ```
//!
//! An empty catalog has no valid page at all, page 1 included.
//!
//! The backend refuses windows with `from + size` above its result window,
//! so deep pages are checked against the total before they are fetched.

use crate::error::ValidationError;

use super::model::PagedResult;

/// Default number of places per page.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Default `index.max_result_window` of an Elasticsearch index.
pub const DEFAULT_MAX_RESULT_WINDOW: u64 = 10_000;

/// Compute the last page number for `total` items.
///
/// A `page_size` of 0 is treated as 1.
pub fn last_page(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size.max(1))
}

/// Computes page metadata for a fixed page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: u64,
    max_result_window: u64,
}

impl Paginator {
    /// Create a paginator. A `page_size` of 0 is treated as 1.
    pub fn new(page_size: u64) -> Self {
        Self {
            page_size: page_size.max(1),
            max_result_window: DEFAULT_MAX_RESULT_WINDOW,
        }
    }

    /// Set the deepest `from + size` the backend serves.
    pub fn with_max_result_window(mut self, max_result_window: u64) -> Self {
        self.max_result_window = max_result_window;
        self
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn max_result_window(&self) -> u64 {
        self.max_result_window
    }

    /// Whether a page starting at `offset` lies inside the result window.
    pub fn fits_window(&self, offset: u64) -> bool {
        offset.saturating_add(self.page_size) <= self.max_result_window
    }

    /// Number of items preceding `page`.
    ///
    /// Returns an error for pages below 1, which can never be valid.
    pub fn offset_for(&self, page: i64) -> Result<u64, ValidationError> {
        if page < 1 {
            return Err(ValidationError::PageOutOfRange { page, last_page: 0 });
        }
        Ok((page as u64 - 1).saturating_mul(self.page_size))
    }

    /// Check `page` against `total`, returning the last page.
    pub fn check_page(&self, total: u64, page: i64) -> Result<u64, ValidationError> {
        let last = last_page(total, self.page_size);

        if page < 1 || page as u64 > last {
            return Err(ValidationError::PageOutOfRange {
                page,
                last_page: last,
            });
        }
        Ok(last)
    }

    /// Check `page` against `total` and assemble the page.
    pub fn paginate<T>(
        &self,
        items: Vec<T>,
        total: u64,
        page: i64,
    ) -> Result<PagedResult<T>, ValidationError> {
        let last = self.check_page(total, page)?;

        Ok(PagedResult {
            items,
            total_count: total,
            current_page: page as u64,
            last_page: last,
        })
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

//! Client-side pagination.
//!
//! Screens hold the full collection in memory and show one fixed-size page
//! at a time. Pages are 1-based.

/// Number of pages needed for `total` items: `ceil(total / page_size)`.
///
/// An empty collection has zero pages. A zero `page_size` counts as 1.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Current page of a list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: usize,
    page: usize,
}

impl Pagination {
    /// Start on page 1. Zero is bumped to a page size of 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            page: 1,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, total: usize) -> usize {
        page_count(total, self.page_size)
    }

    /// Move to `page`, clamped to `1..=page_count(total)`.
    pub fn set_page(&mut self, page: usize, total: usize) {
        let last = self.page_count(total).max(1);
        self.page = page.clamp(1, last);
    }

    /// Back to page 1; called whenever the active tab or filter changes.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    /// Items visible on the current page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page - 1).saturating_mul(self.page_size);
        if start >= items.len() {
            return &[];
        }
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }
}

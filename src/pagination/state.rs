//! Page cursor and metadata for the product listing.
//!
//! All mutation goes through `apply_result` or the gated `request_*`
//! operations; fields are private so nothing else can move the cursor.

use serde::Serialize;
use tracing::debug;

use crate::api::{PageMetadata, Product};

/// Default number of products requested per page
pub const DEFAULT_LIMIT: u32 = 20;

/// Saved cursor of a [`PaginationState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub page: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

/// Pagination cursor plus the products of the current page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationState {
    current_page: u32,
    total_pages: u32,
    total_items: u64,
    limit: u32,
    has_next_page: bool,
    has_previous_page: bool,
    items: Vec<Product>,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl PaginationState {
    /// Create a state positioned on page 1 of 1 with no products
    pub fn new(limit: u32) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
            limit,
            has_next_page: false,
            has_previous_page: false,
            items: Vec::new(),
        }
    }

    /// Merge server metadata and replace the item list.
    ///
    /// Zero or missing `page`/`totalPages` keep the prior value. Missing
    /// `hasNextPage`/`hasPreviousPage` are derived from the merged page
    /// numbers; explicit values are trusted as given. `None` items keep the
    /// previous products.
    pub fn apply_result(&mut self, metadata: Option<&PageMetadata>, items: Option<Vec<Product>>) {
        if let Some(meta) = metadata {
            if let Some(page) = meta.page.filter(|p| *p >= 1) {
                self.current_page = page;
            }
            if let Some(total) = meta.total_pages.filter(|t| *t >= 1) {
                self.total_pages = total;
            }

            self.has_next_page = meta
                .has_next_page
                .unwrap_or(self.current_page < self.total_pages);
            self.has_previous_page = meta
                .has_previous_page
                .unwrap_or(self.current_page > 1);

            self.total_items = meta
                .total
                .unwrap_or_else(|| u64::from(self.total_pages) * u64::from(self.limit));
        }

        if let Some(items) = items {
            self.items = items;
        }

        debug!(
            "Applied page {} of {} ({} items, next={}, previous={})",
            self.current_page,
            self.total_pages,
            self.items.len(),
            self.has_next_page,
            self.has_previous_page
        );
    }

    /// Advance the cursor by one page if a next page is known to exist.
    ///
    /// The flags are re-derived for the new cursor until the server answers.
    pub fn request_next(&mut self) -> bool {
        if !self.has_next_page {
            return false;
        }
        let Some(page) = self.current_page.checked_add(1) else {
            return false;
        };
        self.move_to(page);
        true
    }

    /// Move the cursor back one page if a previous page is known to exist
    pub fn request_previous(&mut self) -> bool {
        if !self.has_previous_page || self.current_page <= 1 {
            return false;
        }
        self.move_to(self.current_page - 1);
        true
    }

    /// Jump the cursor to `page` when it lies within `1..=total_pages`
    pub fn request_page(&mut self, page: u32) -> bool {
        if !self.is_valid_page(page) {
            return false;
        }
        self.move_to(page);
        true
    }

    fn move_to(&mut self, page: u32) {
        self.current_page = page;
        self.has_next_page = page < self.total_pages;
        self.has_previous_page = page > 1;
    }

    /// Position and navigation flags, for restoring after a failed load
    pub fn cursor(&self) -> Cursor {
        Cursor {
            page: self.current_page,
            has_next_page: self.has_next_page,
            has_previous_page: self.has_previous_page,
        }
    }

    /// Put back a cursor taken with [`PaginationState::cursor`], without range checks
    pub(crate) fn restore_cursor(&mut self, cursor: Cursor) {
        self.current_page = cursor.page;
        self.has_next_page = cursor.has_next_page;
        self.has_previous_page = cursor.has_previous_page;
    }

    pub fn is_valid_page(&self, page: u32) -> bool {
        (1..=self.total_pages).contains(&page)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn has_previous_page(&self) -> bool {
        self.has_previous_page
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// First and last item positions shown on the current page, and the total.
    ///
    /// Returns `(0, 0, 0)` when the catalog is empty.
    pub fn item_span(&self) -> (u64, u64, u64) {
        if self.total_items == 0 {
            return (0, 0, 0);
        }
        let limit = u64::from(self.limit);
        let page = u64::from(self.current_page);
        let start = (page - 1) * limit + 1;
        let end = (page * limit).min(self.total_items);
        (start.min(end), end, self.total_items)
    }
}

//! Windowed page ranges with ellipsis markers.
//!
//! The range always starts at page 1, ends at the last page, and keeps a
//! window of `delta` pages on each side of the current one. Gaps of exactly
//! one page are filled with that page instead of an ellipsis.

use serde::{Serialize, Serializer};
use std::fmt;

/// Default number of pages shown on each side of the current page
pub const DEFAULT_PAGE_WINDOW: u32 = 2;

/// Largest page window accepted from configuration
pub const MAX_PAGE_WINDOW: u32 = 50;

/// A single label in a windowed page range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageRangeEntry {
    /// A clickable page number
    Page(u32),
    /// A collapsed run of pages
    Ellipsis,
}

impl PageRangeEntry {
    /// The page number, if this entry is not an ellipsis
    pub fn page(&self) -> Option<u32> {
        match self {
            PageRangeEntry::Page(n) => Some(*n),
            PageRangeEntry::Ellipsis => None,
        }
    }

    #[cfg(test)]
    pub fn is_ellipsis(&self) -> bool {
        matches!(self, PageRangeEntry::Ellipsis)
    }
}

impl fmt::Display for PageRangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRangeEntry::Page(n) => write!(f, "{}", n),
            PageRangeEntry::Ellipsis => f.write_str("..."),
        }
    }
}

// Serialized the way the web client represented it: numbers and "..." markers.
impl Serialize for PageRangeEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageRangeEntry::Page(n) => serializer.serialize_u32(*n),
            PageRangeEntry::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Compute the condensed page labels for `current_page` out of `total_pages`.
///
/// `current_page` is not clamped; the window is centered on whatever value is
/// given. A `total_pages` of 0 or 1 yields `[Page(1)]`.
pub fn compute_range(current_page: u32, total_pages: u32, delta: u32) -> Vec<PageRangeEntry> {
    let current = i64::from(current_page);
    let total = i64::from(total_pages);
    let delta = i64::from(delta);

    let mut kept: Vec<i64> = vec![1];
    kept.extend((current - delta).max(2)..=(current + delta).min(total - 1));
    if total > 1 {
        kept.push(total);
    }

    let mut entries = Vec::with_capacity(kept.len() + 2);
    let mut last: Option<i64> = None;
    for page in kept {
        if let Some(prev) = last {
            match page - prev {
                1 => {}
                2 => entries.push(PageRangeEntry::Page((prev + 1) as u32)),
                _ => entries.push(PageRangeEntry::Ellipsis),
            }
        }
        entries.push(PageRangeEntry::Page(page as u32));
        last = Some(page);
    }

    entries
}

/// Whether the entry at `index` may be hidden when horizontal space is short.
///
/// The first two and the last two entries always stay visible.
pub fn is_collapsible(index: usize, len: usize) -> bool {
    index > 1 && index + 2 < len
}

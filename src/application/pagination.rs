//! Number-based pagination over counted collections.
//!
//! Page numbers are 1-based. The requested page arrives as an untrusted
//! query-string value; the policy is permissive: absent, non-numeric, zero
//! or negative values fall back to page 1, and anything past the end clamps
//! to the last valid page. An empty collection still has one (empty) page.

use serde::Serialize;

use crate::application::repos::PageWindow;

/// A bounded slice of an ordered collection plus pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub page_size: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

impl<T> Page<T> {
    pub fn assemble(items: Vec<T>, number: u64, page_size: u32, total_items: u64) -> Self {
        let total_pages = total_pages(total_items, page_size);
        Self {
            items,
            number,
            page_size,
            total_items,
            total_pages,
            has_previous: number > 1,
            has_next: number < total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
            has_previous: self.has_previous,
            has_next: self.has_next,
        }
    }
}

/// Parse the raw `page` query value. Anything that is not a positive
/// integer means page 1.
pub fn requested_page(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|&page| page >= 1)
        .unwrap_or(1)
}

fn total_pages(total_items: u64, page_size: u32) -> u64 {
    let size = u64::from(page_size.max(1));
    (total_items.div_ceil(size)).max(1)
}

/// Converts requested page numbers into repository windows for a fixed,
/// configuration-supplied page size.
#[derive(Debug, Clone, Copy)]
pub struct Pager {
    page_size: u32,
}

impl Pager {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Clamp a requested page into the valid range for `total_items`.
    pub fn clamp(&self, requested: u64, total_items: u64) -> u64 {
        requested.min(total_pages(total_items, self.page_size))
    }

    pub fn window(&self, page: u64) -> PageWindow {
        PageWindow {
            offset: page.saturating_sub(1) * u64::from(self.page_size),
            limit: self.page_size,
        }
    }
}

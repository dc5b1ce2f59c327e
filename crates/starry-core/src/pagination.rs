//! Page-based listing types.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_PAGE_LIMIT: u64 = 20;
/// Maximum page size.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// A 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    pub page: u64,
    /// Items per page.
    pub limit: u64,
}

impl PageRequest {
    /// Clamps `page` to at least 1 and `limit` to `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Rows to skip.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// One page of items plus the total across all pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Total number of items.
    pub total: u64,
    /// Current page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Whether a later page exists.
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Wraps the items of `request`'s window.
    pub fn new(data: Vec<T>, total: u64, request: PageRequest) -> Self {
        let has_more = request.offset() + (data.len() as u64) < total;
        Self {
            data,
            total,
            page: request.page,
            limit: request.limit,
            has_more,
        }
    }
}

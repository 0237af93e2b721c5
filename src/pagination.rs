//! This modules defines the common functionality for paging data.

use serde::Serialize;

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum transactions to return per page when not specified in a request.
    pub default_page_size: u64,
    /// The page size used for exports, large enough to cover every matching transaction.
    pub export_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            export_limit: 10_000,
        }
    }
}

/// Describes where a page of results sits within the full set of matching items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// The 1-based page number that was returned.
    pub current_page: u64,
    /// The number of pages needed to show every matching item.
    pub total_pages: u64,
    /// The number of matching items, ignoring pagination.
    pub total_items: u64,
    /// The maximum number of items on a page.
    pub items_per_page: u64,
}

impl PageInfo {
    /// Describe page `current_page` of `total_items` items split into pages of `items_per_page`.
    ///
    /// `items_per_page` must be at least one.
    pub fn new(current_page: u64, total_items: u64, items_per_page: u64) -> Self {
        Self {
            current_page,
            total_pages: total_items.div_ceil(items_per_page.max(1)),
            total_items,
            items_per_page,
        }
    }

    /// The page info returned in place of a query that failed.
    pub fn empty(items_per_page: u64) -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
            items_per_page,
        }
    }
}

/// One page of items plus its [PageInfo].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    /// The items on this page.
    pub data: Vec<T>,
    /// Where this page sits in the full result set.
    pub pagination: PageInfo,
}

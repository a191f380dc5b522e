//! List-endpoint query parameters and page metadata.
//!
//! `rpp` (rows per page) and `page` are 1-indexed. When absent, listing
//! defaults to effectively all rows (`rpp` enormous, `page` 1), which mirrors
//! the behavior clients already depend on.

use serde::{Deserialize, Serialize};

/// Effective `rpp` when the client does not ask for a page size.
pub const DEFAULT_RPP: i64 = 99_999_999;

/// Common query parameters accepted by every list endpoint:
/// `search`, `rpp`, `page`, `sort`.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub search: Option<String>,
    pub rpp: Option<i64>,
    pub page: Option<i64>,
    pub sort: Option<String>,
}

impl PageQuery {
    /// Values outside `1..=DEFAULT_RPP` fall back to the default. The cap
    /// keeps the offset arithmetic below well within `i64` for any client
    /// input.
    pub fn rpp(&self) -> i64 {
        self.rpp
            .filter(|r| (1..=DEFAULT_RPP).contains(r))
            .unwrap_or(DEFAULT_RPP)
    }

    pub fn page(&self) -> i64 {
        self.page.filter(|p| (1..=DEFAULT_RPP).contains(p)).unwrap_or(1)
    }

    /// SQL OFFSET for the requested page.
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.rpp()
    }

    /// Sort direction for the fixed `id` sort key. Anything other than the
    /// literal `"desc"` sorts ascending.
    pub fn order(&self) -> &'static str {
        if self.sort.as_deref() == Some("desc") {
            "DESC"
        } else {
            "ASC"
        }
    }

    /// `LIKE` pattern for the search term; an empty term matches all rows.
    pub fn search_pattern(&self) -> String {
        format!("%{}%", self.search.as_deref().unwrap_or(""))
    }
}

/// Page metadata returned alongside list results.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub rpp: i64,
    #[serde(rename = "currentPage")]
    pub current_page: i64,
    #[serde(rename = "nextPage")]
    pub next_page: Option<i64>,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

/// Builds page metadata from the requested page size, current page and the
/// total row count:
///
/// ```text
/// totalPages = ceil(total / rpp)
/// nextPage   = page >= totalPages ? null : page + 1
/// ```
pub fn paginate(rpp: i64, page: i64, total: i64) -> Pagination {
    // Saturate rather than overflow when called with an oversized rpp.
    let total_pages = total.saturating_add(rpp - 1) / rpp;
    let next_page = if page >= total_pages {
        None
    } else {
        Some(page + 1)
    };

    Pagination {
        rpp,
        current_page: page,
        next_page,
        total_pages,
    }
}

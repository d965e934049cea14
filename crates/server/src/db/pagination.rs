//! Offset pagination shared by every list endpoint.

use serde::Deserialize;

/// Default rows per page when the query string omits `per_page`.
pub const DEFAULT_PER_PAGE: i64 = 20;

/// Hard ceiling on `per_page`, whatever the client asks for.
pub const MAX_PER_PAGE: i64 = 100;

/// Page request parsed from the query string.
///
/// Out-of-range values are clamped rather than rejected: page 0 becomes
/// page 1, `per_page` is capped at [`MAX_PER_PAGE`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default, deserialize_with = "crate::models::forms::option_from_str")]
    page: Option<i64>,
    #[serde(default, deserialize_with = "crate::models::forms::option_from_str")]
    per_page: Option<i64>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: Some(1),
            per_page: Some(DEFAULT_PER_PAGE),
        }
    }
}

impl Pagination {
    /// Build a page request directly, applying the same clamping as the
    /// query-string path.
    #[must_use]
    pub const fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// 1-based page number, clamped to at least 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Rows per page, clamped to `1..=MAX_PER_PAGE`.
    #[must_use]
    pub fn per_page(&self) -> i64 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// `LIMIT` value for the SQL query.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.per_page()
    }

    /// `OFFSET` value for the SQL query.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

/// One page of results plus the bookkeeping the list views render.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Rows on this page.
    pub items: Vec<T>,
    /// Total rows matching the filter, across all pages.
    pub total: i64,
    /// 1-based page number this page represents.
    pub page: i64,
    /// Rows per page used for the query.
    pub per_page: i64,
}

impl<T> Page<T> {
    /// Assemble a page from query results and the matching `COUNT(*)`.
    #[must_use]
    pub fn new(items: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page(),
            per_page: pagination.per_page(),
        }
    }

    /// Number of pages needed for `total` rows.
    #[must_use]
    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            1
        } else {
            (self.total + self.per_page - 1) / self.per_page
        }
    }

    /// Whether a later page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_page_one_twenty_rows() {
        let p = Pagination::default();
        assert_eq!(p.page(), 1);
        assert_eq!(p.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn per_page_is_clamped_to_ceiling() {
        let p = Pagination::new(1, 5000);
        assert_eq!(p.per_page(), MAX_PER_PAGE);
    }

    #[test]
    fn page_zero_clamps_to_one() {
        let p = Pagination::new(0, 20);
        assert_eq!(p.page(), 1);
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn offset_skips_earlier_pages() {
        let p = Pagination::new(3, 25);
        assert_eq!(p.offset(), 50);
        assert_eq!(p.limit(), 25);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<i32> = Page::new(vec![], 41, Pagination::new(1, 20));
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(!page.has_prev());
    }

    #[test]
    fn empty_result_still_has_one_page() {
        let page: Page<i32> = Page::new(vec![], 0, Pagination::default());
        assert_eq!(page.total_pages(), 1);
        assert!(!page.has_next());
    }
}

//! Offset pagination primitives shared by list endpoints.

use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// A validated page request (`page >= 1`, `limit >= 1`).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a request from already-numeric values; anything below 1 falls back
    /// to the default.
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: if page >= 1 { page } else { DEFAULT_PAGE },
            limit: if limit >= 1 { limit } else { DEFAULT_LIMIT },
        }
    }

    /// Build a request from raw query-string values.
    ///
    /// Missing, non-numeric, zero or negative values are clamped to the
    /// defaults (page 1, limit 10) rather than rejected.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(limit).unwrap_or(DEFAULT_LIMIT),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of records to skip: `(page - 1) * limit`, floored at 0.
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// Number of pages needed for `total` records.
    pub fn pages_for(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v >= 1)
        .map(|v| v as u64)
}

/// One page of results plus the totals needed to render pagination controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            pages: request.pages_for(total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_apply_to_missing_and_garbage_input() {
        assert_eq!(PageRequest::from_raw(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::from_raw(Some("abc"), Some("")),
            PageRequest::default()
        );
        assert_eq!(
            PageRequest::from_raw(Some("0"), Some("-5")),
            PageRequest::default()
        );
    }

    #[test]
    fn skip_and_pages_follow_page_and_limit() {
        let req = PageRequest::from_raw(Some("3"), Some("20"));
        assert_eq!(req.skip(), 40);
        assert_eq!(req.pages_for(41), 3);
        assert_eq!(req.pages_for(0), 0);
    }

    proptest! {
        /// Property: whatever the client sends, page and limit end up >= 1 and
        /// skip never overflows.
        #[test]
        fn raw_input_always_clamps_to_valid_request(page in any::<String>(), limit in any::<String>()) {
            let req = PageRequest::from_raw(Some(&page), Some(&limit));
            prop_assert!(req.page() >= 1);
            prop_assert!(req.limit() >= 1);
            let _ = req.skip();
        }

        #[test]
        fn pages_cover_total(total in 0u64..10_000, limit in 1u64..500) {
            let req = PageRequest::new(1, limit);
            let pages = req.pages_for(total);
            prop_assert!(pages * limit >= total);
            prop_assert!(pages == 0 || (pages - 1) * limit < total);
        }
    }
}

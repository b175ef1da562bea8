//! Pagination types for the item list endpoint
//!
//! Query strings are parsed loosely: anything that is not a positive integer
//! falls back to the default instead of failing the request.

use serde::{Deserialize, Serialize};

/// Maximum items per page
pub const MAX_LIMIT: u32 = 100;

/// Default items per page
pub const DEFAULT_LIMIT: u32 = 10;

/// Default page number
pub const DEFAULT_PAGE: u32 = 1;

/// Coerce a raw query value into a positive integer.
///
/// Absent, non-numeric, zero and negative values all yield `default`.
/// Surrounding whitespace is ignored.
pub fn coerce_positive(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(default)
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-indexed)
    pub page: u32,
    /// Items per page (max 100)
    pub limit: u32,
}

impl Pagination {
    /// Create pagination with validation.
    ///
    /// - Page is clamped to minimum of 1
    /// - Limit is clamped to 1..=100
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Calculate SQL OFFSET value.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Get LIMIT value.
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Query parameters for pagination, kept as raw strings so bad input
/// can fall back to defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl From<PaginationParams> for Pagination {
    fn from(params: PaginationParams) -> Self {
        Self::new(
            coerce_positive(params.page.as_deref(), DEFAULT_PAGE),
            coerce_positive(params.limit.as_deref(), DEFAULT_LIMIT),
        )
    }
}

/// Paginated result from the store
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    /// Items for current page
    pub items: Vec<T>,
    /// Total count across all pages
    pub total: i64,
    /// Page that was requested
    pub page: Pagination,
}

impl<T> Paginated<T> {
    /// Calculate total number of pages, `ceil(total / limit)`.
    ///
    /// An empty table has zero pages.
    pub fn total_pages(&self) -> u64 {
        let total = self.total.max(0) as u64;
        total.div_ceil(u64::from(self.page.limit))
    }

    /// Metadata block for the response envelope.
    pub fn meta(&self) -> PageMeta {
        PageMeta {
            page: self.page.page,
            limit: self.page.limit,
            total_items: self.total,
            total_pages: self.total_pages(),
        }
    }
}

/// Pagination metadata returned alongside list results
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: i64,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paginated(total: i64, page: u32, limit: u32) -> Paginated<()> {
        Paginated {
            items: vec![],
            total,
            page: Pagination::new(page, limit),
        }
    }

    #[test]
    fn offset_calculation() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(2, 10).offset(), 10);
        assert_eq!(Pagination::new(3, 25).offset(), 50);
    }

    #[test]
    fn offset_does_not_overflow() {
        let p = Pagination::new(u32::MAX, MAX_LIMIT);
        assert_eq!(p.offset(), u64::from(u32::MAX - 1) * 100);
    }

    #[test]
    fn clamps_page() {
        assert_eq!(Pagination::new(0, 10).page, 1);
    }

    #[test]
    fn clamps_limit() {
        assert_eq!(Pagination::new(1, 0).limit, 1);
        assert_eq!(Pagination::new(1, 999).limit, 100);
    }

    #[test]
    fn coercion_falls_back_on_garbage() {
        assert_eq!(coerce_positive(None, 10), 10);
        assert_eq!(coerce_positive(Some(""), 10), 10);
        assert_eq!(coerce_positive(Some("abc"), 10), 10);
        assert_eq!(coerce_positive(Some("2.5"), 10), 10);
        assert_eq!(coerce_positive(Some("0"), 10), 10);
        assert_eq!(coerce_positive(Some("-4"), 10), 10);
        assert_eq!(coerce_positive(Some(" 7 "), 10), 7);
        assert_eq!(coerce_positive(Some("25"), 10), 25);
    }

    #[test]
    fn params_use_defaults() {
        let page = Pagination::from(PaginationParams::default());
        assert_eq!(page, Pagination::new(1, 10));

        let page = Pagination::from(PaginationParams {
            page: Some("nope".into()),
            limit: Some("500".into()),
        });
        assert_eq!(page, Pagination::new(1, 100));
    }

    #[test]
    fn total_pages() {
        assert_eq!(paginated(0, 1, 10).total_pages(), 0);
        assert_eq!(paginated(1, 1, 10).total_pages(), 1);
        assert_eq!(paginated(25, 1, 10).total_pages(), 3);
        assert_eq!(paginated(100, 1, 10).total_pages(), 10);
    }

    #[test]
    fn meta_serializes_camel_case() {
        let meta = paginated(25, 2, 10).meta();
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "page": 2,
                "limit": 10,
                "totalItems": 25,
                "totalPages": 3
            })
        );
    }
}

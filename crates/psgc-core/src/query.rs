// crates/psgc-core/src/query.rs

//! Pagination and keyword-filter contract shared by every level store.
//!
//! Inputs are permissive: anything that is not a usable number falls back to
//! the defaults instead of failing the request.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 1000;
pub const MAX_PER_PAGE: u32 = 1000;

/// Page selection plus keyword filter.
///
/// Construct through [`PaginationParams::new`] or [`PaginationParams::from_raw`]
/// to get the defaulting rules; the stores re-normalize anyway, so a struct
/// literal with out-of-range values is harmless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    pub page: u32,
    pub per_page: u32,
    pub filter: String,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            filter: String::new(),
        }
    }
}

impl PaginationParams {
    pub fn new(page: u32, per_page: u32, filter: impl Into<String>) -> Self {
        Self {
            page,
            per_page,
            filter: filter.into(),
        }
        .normalized()
    }

    /// Builds params from untrusted text, e.g. URL query values.
    ///
    /// ```rust
    /// use psgc_core::query::PaginationParams;
    ///
    /// let p = PaginationParams::from_raw(Some("abc"), Some("5000"), Some("manila"));
    /// assert_eq!((p.page, p.per_page, p.filter.as_str()), (1, 1000, "manila"));
    /// ```
    pub fn from_raw(page: Option<&str>, per_page: Option<&str>, filter: Option<&str>) -> Self {
        let number = |raw: Option<&str>| raw.and_then(|v| v.trim().parse::<u32>().ok()).unwrap_or(0);
        Self::new(number(page), number(per_page), filter.unwrap_or_default())
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn normalized(mut self) -> Self {
        if self.page < 1 {
            self.page = DEFAULT_PAGE;
        }
        if self.per_page < 1 || self.per_page > MAX_PER_PAGE {
            self.per_page = DEFAULT_PER_PAGE;
        }
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u32 {
        self.per_page
    }

    pub fn has_filter(&self) -> bool {
        !self.filter.is_empty()
    }
}

pub fn total_pages(total_items: u64, per_page: u32) -> u64 {
    total_items.div_ceil(u64::from(per_page.max(1)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub item_count: u64,
}

/// The `{metadata, data}` envelope returned by every listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<E> {
    pub metadata: MetaData,
    pub data: Vec<E>,
}

impl<E> Paginated<E> {
    pub fn new(params: &PaginationParams, total_items: u64, data: Vec<E>) -> Self {
        Self {
            metadata: MetaData {
                page: params.page,
                per_page: params.per_page,
                total_items,
                total_pages: total_pages(total_items, params.per_page),
                item_count: data.len() as u64,
            },
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        for (page, per_page) in [(None, None), (Some("0"), Some("0")), (Some("-3"), Some("x")), (Some(""), Some("1001"))] {
            let p = PaginationParams::from_raw(page, per_page, None);
            assert_eq!(p, PaginationParams::default(), "{page:?} {per_page:?}");
        }
    }

    #[test]
    fn valid_values_are_kept() {
        let p = PaginationParams::from_raw(Some(" 2 "), Some("10"), Some("Manila"));
        assert_eq!(p, PaginationParams::new(2, 10, "Manila"));
        assert_eq!(p.offset(), 10);
        assert_eq!(p.limit(), 10);
        assert!(p.has_filter());
    }

    #[test]
    fn upper_per_page_bound_is_inclusive() {
        assert_eq!(PaginationParams::new(1, 1000, "").per_page, 1000);
        assert_eq!(PaginationParams::new(1, 1, "").per_page, 1);
    }

    #[test]
    fn offset_does_not_overflow() {
        let p = PaginationParams::new(u32::MAX, 1000, "");
        assert_eq!(p.offset(), u64::from(u32::MAX - 1) * 1000);
    }

    #[test]
    fn total_pages_is_ceiling() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(1, 1000), 1);
    }

    #[test]
    fn metadata_counts_returned_rows() {
        let params = PaginationParams::new(3, 10, "");
        let page = Paginated::new(&params, 25, vec!["a"; 5]);
        assert_eq!(
            page.metadata,
            MetaData {
                page: 3,
                per_page: 10,
                total_items: 25,
                total_pages: 3,
                item_count: 5,
            }
        );
    }
}

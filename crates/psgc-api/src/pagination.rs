// crates/psgc-api/src/pagination.rs
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use psgc_core::PaginationParams;
use std::convert::Infallible;

/// Raw `page`, `perPage` (or `per_page`) and `filter` query values.
///
/// Kept as text so a malformed number falls back to its default instead of
/// rejecting the request. A repeated key keeps its first value, and
/// `perPage` wins over `per_page` when both are sent. An undecodable query
/// string counts as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub filter: Option<String>,
}

impl PageQuery {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        let mut snake_per_page = None;
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut query.page,
                "perPage" => &mut query.per_page,
                "per_page" => &mut snake_per_page,
                "filter" => &mut query.filter,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query.per_page = query.per_page.or(snake_per_page);
        query
    }

    pub fn into_params(self) -> PaginationParams {
        PaginationParams::from_raw(
            self.page.as_deref(),
            self.per_page.as_deref(),
            self.filter.as_deref(),
        )
    }
}

impl<S: Send + Sync> FromRequestParts<S> for PageQuery {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map(|Query(pairs)| pairs)
            .unwrap_or_default();
        Ok(Self::from_pairs(pairs))
    }
}

//! Paging for the order history.

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// `?page=&per_page=` on list endpoints. Out-of-range values are clamped
/// rather than rejected.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Page number, 1-based
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page, capped at 100
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_per_page() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    pub fn page(&self) -> u64 {
        self.page.max(1)
    }

    pub fn per_page(&self) -> u64 {
        self.per_page.clamp(1, MAX_PAGE_SIZE)
    }

    /// Zero-based page index for sea-orm paginators.
    pub fn page_index(&self) -> u64 {
        self.page() - 1
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A page of results with its position in the full listing.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total: u64) -> Self {
        let per_page = params.per_page();
        Self {
            data,
            meta: PaginationMeta {
                page: params.page(),
                per_page,
                total,
                total_pages: total.div_ceil(per_page),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_clamped() {
        let params = PaginationParams { page: 0, per_page: 500 };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_index(), 0);
        assert_eq!(params.per_page(), MAX_PAGE_SIZE);

        let empty = PaginationParams { page: 3, per_page: 0 };
        assert_eq!(empty.per_page(), 1);
        assert_eq!(empty.page_index(), 2);
    }

    #[test]
    fn test_meta_counts_partial_last_page() {
        let params = PaginationParams { page: 2, per_page: 20 };
        let page = Paginated::new(vec![1, 2], &params, 41);
        assert_eq!(page.meta.page, 2);
        assert_eq!(page.meta.total_pages, 3);

        let none = Paginated::<i32>::new(Vec::new(), &PaginationParams::default(), 0);
        assert_eq!(none.meta.total_pages, 0);
    }
}

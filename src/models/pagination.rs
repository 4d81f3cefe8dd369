use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            page_size: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size.unwrap_or(20).clamp(1, 100)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: u64, page_size: u64, total: u64) -> Self {
        let total_pages = total.div_ceil(page_size.max(1));
        Self {
            data,
            page,
            page_size,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_clamped() {
        let params = PaginationParams {
            page: Some(0),
            page_size: Some(1000),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), 100);
        assert_eq!(PaginationParams::default().page_size(), 20);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(PaginatedResponse::<u8>::new(vec![], 1, 20, 0).total_pages, 0);
        assert_eq!(PaginatedResponse::<u8>::new(vec![], 1, 20, 20).total_pages, 1);
        assert_eq!(PaginatedResponse::<u8>::new(vec![], 1, 20, 21).total_pages, 2);
    }
}

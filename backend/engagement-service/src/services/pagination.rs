//! Page/limit validation and page arithmetic shared by every listing

use crate::error::{AppError, Result};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Validated 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Result<Self> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page < 1 {
            return Err(AppError::invalid("page must be at least 1"));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::invalid(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }

    /// Wrap a store result with the page metadata
    pub fn paged<T>(&self, (items, total): (Vec<T>, i64)) -> Paged<T> {
        Paged {
            total_pages: self.total_pages(total),
            items,
            total,
            page: self.page,
            limit: self.limit,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of items plus the size of the full result set
#[derive(Debug, Clone)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        let req = PageRequest::new(None, None).unwrap();
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn third_page_of_twenty_five() {
        let req = PageRequest::new(Some(3), Some(10)).unwrap();
        assert_eq!(req.offset(), 20);
        assert_eq!(req.total_pages(25), 3);

        let items: Vec<i64> = (0..25).skip(req.offset() as usize).take(10).collect();
        let paged = req.paged((items, 25));
        assert_eq!(paged.items.len(), 5);
        assert_eq!(paged.total_pages, 3);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let req = PageRequest::default();
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(10), 1);
        assert_eq!(req.total_pages(11), 2);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(PageRequest::new(Some(0), None).is_err());
        assert!(PageRequest::new(Some(-2), None).is_err());
        assert!(PageRequest::new(None, Some(0)).is_err());
        assert!(PageRequest::new(None, Some(MAX_LIMIT + 1)).is_err());
        assert!(PageRequest::new(None, Some(MAX_LIMIT)).is_ok());
    }
}

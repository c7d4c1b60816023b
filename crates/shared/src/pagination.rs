//! Page/limit pagination.

use thiserror::Error;

/// Error type for page parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("page must be at least 1")]
    InvalidPage,
    #[error("limit must be at least 1")]
    InvalidLimit,
}

/// Upper bound on page size; larger requests are clamped.
pub const MAX_LIMIT: u32 = 100;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Builds a page request from optional query values.
    ///
    /// Missing values fall back to page 1 and `default_limit`. Zero is
    /// rejected. Limits above [`MAX_LIMIT`] are clamped.
    pub fn new(
        page: Option<u32>,
        limit: Option<u32>,
        default_limit: u32,
    ) -> Result<Self, PaginationError> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);

        if page == 0 {
            return Err(PaginationError::InvalidPage);
        }
        if limit == 0 {
            return Err(PaginationError::InvalidLimit);
        }

        Ok(Self {
            page,
            limit: limit.min(MAX_LIMIT),
        })
    }

    /// Rows to skip, for SQL `OFFSET`.
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    /// Page size, for SQL `LIMIT`.
    pub fn limit(&self) -> i64 {
        self.limit as i64
    }

    /// Number of pages needed to show `total` rows at this page size.
    pub fn total_pages(&self, total: i64) -> u32 {
        total_pages(total, self.limit)
    }
}

/// `ceil(total / limit)`, zero when there is nothing to show.
pub fn total_pages(total: i64, limit: u32) -> u32 {
    if total <= 0 || limit == 0 {
        return 0;
    }
    let limit = limit as i64;
    ((total + limit - 1) / limit) as u32
}

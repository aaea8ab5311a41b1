//! Paging parameters shared by every list operation.
//!
//! Zero means "unset" and falls back to the default; negative values and
//! oversized limits are rejected before any store call.

use crate::error::StorageError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// 1-based page of a fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
    offset: i64,
}

impl Page {
    pub fn resolve(page: i64, limit: i64) -> Result<Self, StorageError> {
        if page < 0 {
            return Err(StorageError::Validation(format!(
                "page must not be negative, got {}",
                page
            )));
        }
        let page = if page == 0 { DEFAULT_PAGE } else { page };
        let limit = resolve_limit(limit)?;

        // The skip count must fit in an i64
        let offset = (page - 1).checked_mul(limit).ok_or_else(|| {
            StorageError::Validation(format!("page {} is out of range for limit {}", page, limit))
        })?;

        Ok(Self { page, limit, offset })
    }

    /// Documents to skip before this page starts
    pub fn skip(&self) -> u64 {
        self.offset as u64
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}

/// Offset-based window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

impl Window {
    pub fn resolve(offset: i64, limit: i64) -> Result<Self, StorageError> {
        if offset < 0 {
            return Err(StorageError::Validation(format!(
                "offset must not be negative, got {}",
                offset
            )));
        }
        Ok(Self {
            offset,
            limit: resolve_limit(limit)?,
        })
    }
}

fn resolve_limit(limit: i64) -> Result<i64, StorageError> {
    match limit {
        0 => Ok(DEFAULT_LIMIT),
        l if l < 0 => Err(StorageError::Validation(format!(
            "limit must not be negative, got {}",
            l
        ))),
        l if l > MAX_LIMIT => Err(StorageError::Validation(format!(
            "limit must be at most {}, got {}",
            MAX_LIMIT, l
        ))),
        l => Ok(l),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_falls_back_to_defaults() {
        let page = Page::resolve(0, 0).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn test_skip_for_later_page() {
        let page = Page::resolve(3, 20).unwrap();
        assert_eq!(page.skip(), 40);
        assert_eq!(page.offset(), 40);
    }

    #[test]
    fn test_negative_and_oversized_rejected() {
        assert!(matches!(Page::resolve(-1, 10), Err(StorageError::Validation(_))));
        assert!(matches!(Page::resolve(1, -5), Err(StorageError::Validation(_))));
        assert!(matches!(Page::resolve(1, MAX_LIMIT + 1), Err(StorageError::Validation(_))));
        assert!(Page::resolve(1, MAX_LIMIT).is_ok());
    }

    #[test]
    fn test_page_past_i64_range_rejected() {
        assert!(matches!(Page::resolve(i64::MAX, 10), Err(StorageError::Validation(_))));
        assert!(matches!(Page::resolve(i64::MAX / 2, MAX_LIMIT), Err(StorageError::Validation(_))));

        let last = Page::resolve(i64::MAX / 10, 10).unwrap();
        assert_eq!(last.offset(), (i64::MAX / 10 - 1) * 10);
    }

    #[test]
    fn test_window() {
        assert_eq!(Window::resolve(5, 0).unwrap(), Window { offset: 5, limit: 10 });
        assert!(Window::resolve(-1, 10).is_err());
    }
}

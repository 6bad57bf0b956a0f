// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Page/limit query parameters.
//!
//! Routes accept `?page=` (1-based) and `?limit=`; each route picks its own
//! default but everything is clamped to [`MAX_LIMIT`].

use serde::Deserialize;
use utoipa::IntoParams;

/// Hard ceiling on page size across all routes.
pub const MAX_LIMIT: u64 = 100;

/// Raw pagination query parameters as they arrive on the wire.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
pub struct PageQuery {
    /// 1-based page number (default 1).
    pub page: Option<u64>,
    /// Page size (clamped to the route default / global maximum).
    pub limit: Option<u64>,
}

/// Resolved pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
    pub offset: u64,
}

impl PageQuery {
    /// Clamp raw parameters into a usable window.
    ///
    /// `page` is floored at 1; `limit` is floored at 1 and capped at
    /// `min(default's route maximum, MAX_LIMIT)`.
    pub fn resolve(&self, default_limit: u64) -> Page {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self
            .limit
            .unwrap_or(default_limit)
            .clamp(1, MAX_LIMIT);
        Page {
            page,
            limit,
            offset: page.saturating_sub(1).saturating_mul(limit),
        }
    }
}

/// Apply a resolved window to an in-memory row set, returning the page and
/// the pre-pagination total.
pub fn slice_page<T>(mut rows: Vec<T>, page: Page) -> (Vec<T>, u64) {
    let total = rows.len() as u64;
    let start = (page.offset as usize).min(rows.len());
    let end = (start + page.limit as usize).min(rows.len());
    let page_rows = rows.drain(start..end).collect();
    (page_rows, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let q = PageQuery::default();
        let p = q.resolve(20);
        assert_eq!(p, Page { page: 1, limit: 20, offset: 0 });
    }

    #[test]
    fn limit_clamped_to_maximum() {
        let q = PageQuery { page: Some(2), limit: Some(10_000) };
        let p = q.resolve(50);
        assert_eq!(p.limit, MAX_LIMIT);
        assert_eq!(p.offset, MAX_LIMIT);
    }

    #[test]
    fn zero_values_floored() {
        let q = PageQuery { page: Some(0), limit: Some(0) };
        let p = q.resolve(20);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 1);
    }

    #[test]
    fn huge_page_numbers_saturate_instead_of_overflowing() {
        let q = PageQuery { page: Some(u64::MAX), limit: Some(100) };
        let p = q.resolve(20);
        assert_eq!(p.page, u64::MAX);
        assert_eq!(p.offset, u64::MAX);

        let (rows, total) = slice_page(vec![1u32, 2, 3], p);
        assert!(rows.is_empty());
        assert_eq!(total, 3);
    }

    #[test]
    fn slice_page_returns_window_and_total() {
        let rows: Vec<u32> = (0..10).collect();
        let (page_rows, total) = slice_page(rows, Page { page: 2, limit: 3, offset: 3 });
        assert_eq!(page_rows, vec![3, 4, 5]);
        assert_eq!(total, 10);
    }

    #[test]
    fn slice_page_past_the_end_is_empty() {
        let rows: Vec<u32> = (0..4).collect();
        let (page_rows, total) = slice_page(rows, Page { page: 3, limit: 3, offset: 6 });
        assert!(page_rows.is_empty());
        assert_eq!(total, 4);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Uniform response envelope.
//!
//! Every endpoint returns the same wire shape:
//!
//! ```json
//! { "success": true,  "data": ..., "meta": { "page": 1, ... } }
//! { "success": false, "error": "...", "code": "...", "details": [...] }
//! ```
//!
//! `data` and `error` are never both populated. Handlers build success
//! responses through the helpers below; failures go through
//! [`crate::error::ApiError`], which renders the same envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::validate::FieldError;

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    /// 1-based page number.
    pub page: u64,
    /// Page size actually applied (after clamping).
    pub limit: u64,
    /// Total matching rows before pagination.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PageMeta {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// The one wire shape for all outcomes.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            details: None,
            meta: None,
        }
    }

    pub fn error(
        message: impl Into<String>,
        code: impl Into<String>,
        details: Option<Vec<FieldError>>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: Some(code.into()),
            details,
            meta: None,
        }
    }
}

/// 200 with a payload.
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(Envelope::success(data))).into_response()
}

/// 201 for resource creation.
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(Envelope::success(data))).into_response()
}

/// 204 with an empty body (deletions).
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

/// 200 with a page of rows and pagination metadata.
pub fn paginated<T: Serialize>(rows: Vec<T>, page: u64, limit: u64, total: u64) -> Response {
    let mut envelope = Envelope::success(rows);
    envelope.meta = Some(PageMeta::new(page, limit, total));
    (StatusCode::OK, Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn ok_wraps_payload_in_envelope() {
        let response = ok(serde_json::json!({"id": "abc"}));
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], "abc");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn created_uses_201() {
        let response = created(serde_json::json!({"id": 1}));
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn no_content_has_empty_body() {
        let response = no_content();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn paginated_attaches_meta() {
        let response = paginated(vec![1, 2, 3], 2, 3, 10);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["meta"]["page"], 2);
        assert_eq!(body["meta"]["total_pages"], 4);
        assert_eq!(body["meta"]["has_next"], true);
        assert_eq!(body["meta"]["has_prev"], true);
    }

    #[test]
    fn page_meta_edges() {
        let first = PageMeta::new(1, 20, 5);
        assert_eq!(first.total_pages, 1);
        assert!(!first.has_next);
        assert!(!first.has_prev);

        let empty = PageMeta::new(1, 20, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
    }
}

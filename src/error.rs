// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Closed API error taxonomy.
//!
//! Every failure a handler can surface is one of these variants; the
//! envelope mapping (variant → HTTP status → body) lives here and nowhere
//! else, so the same outcome kind always produces the same status code on
//! every route. Domain code never signals errors through message-string
//! matching — services return `NotFound`/`Conflict` variants directly.
//!
//! Internal error messages are echoed to clients only when `DEV_MODE` is
//! set; otherwise a generic message is returned and the detail goes to the
//! log.

use axum::{
    http::{header::RETRY_AFTER, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::config;
use crate::response::Envelope;
use crate::storage::StorageError;
use crate::validate::FieldError;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// No resolvable identity on a protected route.
    Unauthorized,
    /// Identity resolved but not allowed to perform the operation.
    Forbidden(String),
    /// Request body or query parameters failed schema validation.
    Validation(Vec<FieldError>),
    /// The addressed resource does not exist.
    NotFound(String),
    /// Uniqueness or state conflict (duplicate email, duplicate code, ...).
    Conflict(String),
    /// Malformed request outside the schema validator's scope.
    BadRequest(String),
    /// Fixed-window rate limit exceeded.
    RateLimited { retry_after_secs: u64 },
    /// Anything unclassified. Message redacted outside development mode.
    Internal(String),
}

impl ApiError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable code for the `code` envelope field.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Validation(_) => "validation_failed",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::BadRequest(_) => "bad_request",
            ApiError::RateLimited { .. } => "rate_limited",
            ApiError::Internal(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message.
    fn client_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "Unauthorized".to_string(),
            ApiError::Forbidden(msg) => msg.clone(),
            ApiError::Validation(_) => "Validation failed".to_string(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::RateLimited { .. } => "Too many requests".to_string(),
            ApiError::Internal(msg) => {
                if config::dev_mode() {
                    msg.clone()
                } else {
                    "Internal server error".to_string()
                }
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(errors) => {
                write!(f, "Validation failed ({} field error(s))", errors.len())
            }
            ApiError::Unauthorized => write!(f, "Unauthorized"),
            ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Internal(msg) => write!(f, "{msg}"),
            ApiError::RateLimited { retry_after_secs } => {
                write!(f, "Too many requests (retry after {retry_after_secs}s)")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            StorageError::AlreadyExists(what) => {
                ApiError::Conflict(format!("{what} already exists"))
            }
            StorageError::Invalid(message) => ApiError::BadRequest(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, ApiError::Internal(_)) {
            tracing::error!(error = %self, "request failed");
        }

        let status = self.status_code();
        let details = match &self {
            ApiError::Validation(errors) => Some(errors.clone()),
            _ => None,
        };
        let body = Json(Envelope::<()>::error(
            self.client_message(),
            self.code(),
            details,
        ));

        match self {
            ApiError::RateLimited { retry_after_secs } => {
                (status, [(RETRY_AFTER, retry_after_secs.to_string())], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn status_mapping_is_total_and_deterministic() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::forbidden("nope").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Validation(vec![]).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::not_found("User not found").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::conflict("dup").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::bad_request("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::RateLimited { retry_after_secs: 1 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn validation_error_carries_field_details() {
        let err = ApiError::Validation(vec![FieldError::new(
            "password",
            "must be at least 8 characters",
        )]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "validation_failed");
        assert_eq!(body["details"][0]["field"], "password");
    }

    #[tokio::test]
    async fn unauthorized_envelope_shape() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn rate_limited_sets_retry_after_header() {
        let response = ApiError::RateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "42");
    }

    #[test]
    fn internal_message_redacted_outside_dev_mode() {
        // DEV_MODE is not set when the test suite runs
        let err = ApiError::internal("secret detail");
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn storage_errors_map_to_domain_variants() {
        let nf: ApiError = StorageError::NotFound("Wallet abc".into()).into();
        assert_eq!(nf, ApiError::NotFound("Wallet abc not found".into()));

        let dup: ApiError = StorageError::AlreadyExists("Currency USD".into()).into();
        assert_eq!(dup, ApiError::Conflict("Currency USD already exists".into()));

        let bad: ApiError = StorageError::Invalid("Insufficient balance".into()).into();
        assert_eq!(bad, ApiError::BadRequest("Insufficient balance".into()));
    }
}

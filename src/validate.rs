// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request body validation.
//!
//! Every mutating endpoint declares a request type implementing [`Validate`]
//! and extracts it with [`ValidJson`]. Validation collects *every* violated
//! field (not just the first) in declaration order, so clients get a complete
//! picture in one round trip and tests can assert deterministically.
//!
//! ```rust,ignore
//! async fn create_currency(
//!     AdminOnly(user): AdminOnly,
//!     State(state): State<AppState>,
//!     ValidJson(req): ValidJson<CreateCurrencyRequest>,
//! ) -> Result<Response, ApiError> { ... }
//! ```

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

/// A single violated field with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Name of the offending request field.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation contract for request bodies.
///
/// Implementations run their checks through a [`Checker`] so violations are
/// reported in the order fields are declared.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// Accumulates field errors in check order.
#[derive(Debug, Default)]
pub struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// String length lower bound (counted in characters).
    pub fn min_len(&mut self, field: &str, value: &str, min: usize) {
        if value.chars().count() < min {
            self.push(field, format!("must be at least {min} characters"));
        }
    }

    /// String length upper bound.
    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(field, format!("must be at most {max} characters"));
        }
    }

    /// Exact string length (currency/country codes).
    pub fn exact_len(&mut self, field: &str, value: &str, len: usize) {
        if value.chars().count() != len {
            self.push(field, format!("must be exactly {len} characters"));
        }
    }

    /// Non-empty after trimming.
    pub fn required(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
    }

    /// Loose RFC-style email shape: one `@` with non-empty local part and a
    /// dotted domain.
    pub fn email(&mut self, field: &str, value: &str) {
        let mut parts = value.splitn(2, '@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        let ok = !local.is_empty()
            && !domain.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !value.contains(char::is_whitespace);
        if !ok {
            self.push(field, "must be a valid email address");
        }
    }

    /// Absolute URL per the `url` crate.
    pub fn url(&mut self, field: &str, value: &str) {
        if url::Url::parse(value).is_err() {
            self.push(field, "must be a valid URL");
        }
    }

    /// UUID shape.
    pub fn uuid(&mut self, field: &str, value: &str) {
        if uuid::Uuid::parse_str(value).is_err() {
            self.push(field, "must be a valid UUID");
        }
    }

    /// Strictly positive, finite number. NaN and infinities are rejected
    /// explicitly rather than falling through a comparison.
    pub fn positive(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.push(field, "must be a finite number");
        } else if value <= 0.0 {
            self.push(field, "must be positive");
        }
    }

    /// Finite and >= 0.
    pub fn non_negative(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.push(field, "must be a finite number");
        } else if value < 0.0 {
            self.push(field, "must not be negative");
        }
    }

    /// Arbitrary predicate with a caller-supplied message.
    pub fn check(&mut self, field: &str, ok: bool, message: &str) {
        if !ok {
            self.push(field, message);
        }
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// JSON body extractor that parses *and* validates in one step.
///
/// A body that fails to deserialize (wrong types, unknown enum values,
/// missing required fields) is reported through the same 422 envelope as a
/// declarative validation failure, keyed under `body`.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ApiError::Validation(vec![FieldError::new("body", rejection.body_text())])
            })?;

        value.validate().map_err(ApiError::Validation)?;
        Ok(ValidJson(value))
    }
}

/// Path extractor whose rejection renders the standard error envelope.
///
/// Drop-in for `axum::extract::Path`; a non-matching segment (e.g. a
/// malformed UUID) becomes a 400 with the usual `{success:false}` body
/// instead of axum's plain-text default.
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: serde::de::DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        Ok(Path(value))
    }
}

/// Query extractor whose rejection renders the standard error envelope,
/// keyed under `query` like [`ValidJson`] keys body rejections under
/// `body`.
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    ApiError::Validation(vec![FieldError::new("query", rejection.body_text())])
                })?;
        Ok(Query(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Signup {
        email: String,
        password: String,
        full_name: String,
    }

    impl Validate for Signup {
        fn validate(&self) -> Result<(), Vec<FieldError>> {
            let mut c = Checker::new();
            c.email("email", &self.email);
            c.min_len("password", &self.password, 8);
            c.min_len("full_name", &self.full_name, 2);
            c.finish()
        }
    }

    #[test]
    fn collects_all_errors_in_declaration_order() {
        let bad = Signup {
            email: "not-an-email".into(),
            password: "abc".into(),
            full_name: "x".into(),
        };

        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].field, "email");
        assert_eq!(errors[1].field, "password");
        assert_eq!(errors[2].field, "full_name");
    }

    #[test]
    fn valid_input_passes() {
        let good = Signup {
            email: "a@example.com".into(),
            password: "longenough".into(),
            full_name: "Ada Lovelace".into(),
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn email_rejects_common_malformations() {
        let mut c = Checker::new();
        c.email("email", "@example.com");
        c.email("email", "user@");
        c.email("email", "user@nodot");
        c.email("email", "two words@example.com");
        assert_eq!(c.finish().unwrap_err().len(), 4);

        let mut c = Checker::new();
        c.email("email", "user@example.com");
        assert!(c.finish().is_ok());
    }

    #[test]
    fn positive_rejects_nan_and_infinity() {
        let mut c = Checker::new();
        c.positive("amount", f64::NAN);
        c.positive("amount", f64::INFINITY);
        c.positive("amount", -1.0);
        c.positive("amount", 0.0);
        let errors = c.finish().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0].message, "must be a finite number");

        let mut c = Checker::new();
        c.positive("amount", 0.01);
        assert!(c.finish().is_ok());
    }

    #[test]
    fn exact_len_for_codes() {
        let mut c = Checker::new();
        c.exact_len("code", "USD", 3);
        c.exact_len("country_code", "USA", 2);
        let errors = c.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "country_code");
    }

    #[test]
    fn url_check_uses_url_crate() {
        let mut c = Checker::new();
        c.url("flag_url", "https://example.com/flag.svg");
        c.url("flag_url", "not a url");
        let errors = c.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
    }
}

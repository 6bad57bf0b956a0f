// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Currency reference data. Reads for any authenticated caller,
//! mutations admin-only by route policy.

use axum::{
    extract::State,
    response::Response,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::response;
use crate::state::AppState;
use crate::storage::{Currency, CurrencyRepository};
use crate::validate::{Checker, FieldError, Path, Query, Validate, ValidJson};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCurrencyRequest {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub country_code: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Validate for CreateCurrencyRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.exact_len("code", &self.code, 3);
        checker.required("name", &self.name);
        checker.required("symbol", &self.symbol);
        checker.exact_len("country_code", &self.country_code, 2);
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCurrencyRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Validate for UpdateCurrencyRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        if let Some(name) = &self.name {
            checker.required("name", name);
        }
        checker.finish()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ActiveFilter {
    /// Include inactive entries (default false).
    #[serde(default)]
    pub include_inactive: bool,
}

/// List currencies.
#[utoipa::path(
    get,
    path = "/v1/currencies",
    tag = "Currencies",
    security(("bearer" = [])),
    params(ActiveFilter),
    responses((status = 200, description = "Currencies", body = [Currency]))
)]
pub async fn list_currencies(
    State(state): State<AppState>,
    Query(filter): Query<ActiveFilter>,
) -> Result<Response, ApiError> {
    let rows = CurrencyRepository::new(&state.db).list(!filter.include_inactive)?;
    Ok(response::ok(rows))
}

/// Create a currency (admin).
#[utoipa::path(
    post,
    path = "/v1/currencies",
    tag = "Currencies",
    security(("bearer" = [])),
    request_body = CreateCurrencyRequest,
    responses(
        (status = 201, description = "Currency created", body = Currency),
        (status = 409, description = "Code already registered"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn create_currency(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateCurrencyRequest>,
) -> Result<Response, ApiError> {
    let currency = CurrencyRepository::new(&state.db).create(
        req.code,
        req.name,
        req.symbol,
        req.country_code,
        req.is_active,
    )?;
    Ok(response::created(currency))
}

/// Fetch one currency.
#[utoipa::path(
    get,
    path = "/v1/currencies/{id}",
    tag = "Currencies",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Currency id")),
    responses(
        (status = 200, description = "Currency", body = Currency),
        (status = 404, description = "No such currency"),
    )
)]
pub async fn get_currency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(response::ok(CurrencyRepository::new(&state.db).get(id)?))
}

/// Update a currency (admin).
#[utoipa::path(
    put,
    path = "/v1/currencies/{id}",
    tag = "Currencies",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Currency id")),
    request_body = UpdateCurrencyRequest,
    responses(
        (status = 200, description = "Updated currency", body = Currency),
        (status = 404, description = "No such currency"),
    )
)]
pub async fn update_currency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateCurrencyRequest>,
) -> Result<Response, ApiError> {
    let currency =
        CurrencyRepository::new(&state.db).update(id, req.name, req.symbol, req.is_active)?;
    Ok(response::ok(currency))
}

/// Delete a currency (admin).
#[utoipa::path(
    delete,
    path = "/v1/currencies/{id}",
    tag = "Currencies",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Currency id")),
    responses(
        (status = 204, description = "Currency deleted"),
        (status = 404, description = "No such currency"),
    )
)]
pub async fn delete_currency(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    CurrencyRepository::new(&state.db).delete(id)?;
    Ok(response::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_lengths_are_enforced() {
        let req = CreateCurrencyRequest {
            code: "DOLLAR".into(),
            name: "Dollar".into(),
            symbol: "$".into(),
            country_code: "USA".into(),
            is_active: true,
        };
        let errors = req.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["code", "country_code"]);
    }

    #[test]
    fn is_active_defaults_to_true() {
        let req: CreateCurrencyRequest = serde_json::from_str(
            r#"{"code":"USD","name":"US Dollar","symbol":"$","country_code":"US"}"#,
        )
        .unwrap();
        assert!(req.is_active);
    }
}

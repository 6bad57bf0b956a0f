// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Exchange rate endpoints, including the conversion helper.

use axum::{
    extract::State,
    response::Response,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::response;
use crate::state::AppState;
use crate::storage::{ExchangeRate, ExchangeRateRepository};
use crate::validate::{Checker, FieldError, Path, Query, Validate, ValidJson};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertRateRequest {
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    #[serde(default)]
    pub source: Option<String>,
}

impl Validate for UpsertRateRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.exact_len("from_currency", &self.from_currency, 3);
        checker.exact_len("to_currency", &self.to_currency, 3);
        checker.positive("rate", self.rate);
        checker.finish()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConvertQuery {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversionResponse {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub rate: f64,
    pub converted: f64,
}

/// List all stored rates.
#[utoipa::path(
    get,
    path = "/v1/exchange-rates",
    tag = "Exchange Rates",
    security(("bearer" = [])),
    responses((status = 200, description = "Exchange rates", body = [ExchangeRate]))
)]
pub async fn list_rates(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(response::ok(ExchangeRateRepository::new(&state.db).list()?))
}

/// Insert or replace the rate for a pair (admin).
#[utoipa::path(
    post,
    path = "/v1/exchange-rates",
    tag = "Exchange Rates",
    security(("bearer" = [])),
    request_body = UpsertRateRequest,
    responses(
        (status = 201, description = "Rate stored", body = ExchangeRate),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn upsert_rate(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<UpsertRateRequest>,
) -> Result<Response, ApiError> {
    let rate = ExchangeRateRepository::new(&state.db).upsert(
        req.from_currency,
        req.to_currency,
        req.rate,
        req.source,
    )?;
    Ok(response::created(rate))
}

/// Convert an amount through the stored direct pair rate.
#[utoipa::path(
    get,
    path = "/v1/exchange-rates/convert",
    tag = "Exchange Rates",
    security(("bearer" = [])),
    params(ConvertQuery),
    responses(
        (status = 200, description = "Conversion result", body = ConversionResponse),
        (status = 404, description = "No rate stored for the pair"),
        (status = 422, description = "Bad query values"),
    )
)]
pub async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Response, ApiError> {
    let mut checker = Checker::new();
    checker.exact_len("from", &query.from, 3);
    checker.exact_len("to", &query.to, 3);
    checker.non_negative("amount", query.amount);
    checker.finish().map_err(ApiError::Validation)?;

    let (rate, converted) =
        ExchangeRateRepository::new(&state.db).convert(&query.from, &query.to, query.amount)?;

    Ok(response::ok(ConversionResponse {
        from: rate.from_currency,
        to: rate.to_currency,
        amount: query.amount,
        rate: rate.rate,
        converted,
    }))
}

/// Delete a stored rate (admin).
#[utoipa::path(
    delete,
    path = "/v1/exchange-rates/{id}",
    tag = "Exchange Rates",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Rate id")),
    responses(
        (status = 204, description = "Rate deleted"),
        (status = 404, description = "No such rate"),
    )
)]
pub async fn delete_rate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    ExchangeRateRepository::new(&state.db).delete(id)?;
    Ok(response::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_must_be_positive_and_finite() {
        let mut req = UpsertRateRequest {
            from_currency: "USD".into(),
            to_currency: "EUR".into(),
            rate: 0.0,
            source: None,
        };
        assert_eq!(req.validate().unwrap_err()[0].field, "rate");

        req.rate = f64::INFINITY;
        assert_eq!(req.validate().unwrap_err()[0].field, "rate");

        req.rate = 0.92;
        assert!(req.validate().is_ok());
    }
}

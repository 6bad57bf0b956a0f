// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Economic indicator endpoints. Reads are open to any authenticated
//! caller; mutations are admin operations via the route policy.

use axum::{extract::State, response::Response};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;
use crate::response;
use crate::state::AppState;
use crate::storage::{EconomicIndicator, EconomicIndicatorRepository, IndicatorKind};
use crate::validate::{Checker, FieldError, Path, Query, Validate, ValidJson};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateIndicatorRequest {
    pub country_code: String,
    pub indicator_type: IndicatorKind,
    pub value: f64,
    pub period: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl Validate for CreateIndicatorRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.exact_len("country_code", &self.country_code, 2);
        checker.check("value", self.value.is_finite(), "must be a finite number");
        checker.required("period", &self.period);
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateIndicatorRequest {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl Validate for UpdateIndicatorRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        if let Some(value) = self.value {
            checker.check("value", value.is_finite(), "must be a finite number");
        }
        if let Some(period) = &self.period {
            checker.required("period", period);
        }
        checker.finish()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct IndicatorFilter {
    /// ISO 3166-1 alpha-2 country code.
    #[serde(default)]
    pub country_code: Option<String>,
    /// Indicator kind (gdp, inflation, ...).
    #[serde(default, rename = "type")]
    pub indicator_type: Option<IndicatorKind>,
}

/// List economic indicators, optionally by country and kind.
#[utoipa::path(
    get,
    path = "/v1/economic-indicators",
    tag = "Economic Indicators",
    security(("bearer" = [])),
    params(IndicatorFilter),
    responses((status = 200, description = "Indicators, newest first", body = [EconomicIndicator]))
)]
pub async fn list_indicators(
    State(state): State<AppState>,
    Query(filter): Query<IndicatorFilter>,
) -> Result<Response, ApiError> {
    let rows = EconomicIndicatorRepository::new(&state.db)
        .list(filter.country_code.as_deref(), filter.indicator_type)?;
    Ok(response::ok(rows))
}

/// Record an indicator reading (admin).
#[utoipa::path(
    post,
    path = "/v1/economic-indicators",
    tag = "Economic Indicators",
    security(("bearer" = [])),
    request_body = CreateIndicatorRequest,
    responses(
        (status = 201, description = "Indicator created", body = EconomicIndicator),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn create_indicator(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateIndicatorRequest>,
) -> Result<Response, ApiError> {
    let indicator = EconomicIndicatorRepository::new(&state.db).create(
        req.country_code,
        req.indicator_type,
        req.value,
        req.period,
        req.source,
    )?;
    Ok(response::created(indicator))
}

/// Fetch one indicator.
#[utoipa::path(
    get,
    path = "/v1/economic-indicators/{id}",
    tag = "Economic Indicators",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Indicator id")),
    responses(
        (status = 200, description = "Indicator", body = EconomicIndicator),
        (status = 404, description = "No such indicator"),
    )
)]
pub async fn get_indicator(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(response::ok(
        EconomicIndicatorRepository::new(&state.db).get(id)?,
    ))
}

/// Revise an indicator reading (admin).
#[utoipa::path(
    put,
    path = "/v1/economic-indicators/{id}",
    tag = "Economic Indicators",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Indicator id")),
    request_body = UpdateIndicatorRequest,
    responses(
        (status = 200, description = "Updated indicator", body = EconomicIndicator),
        (status = 404, description = "No such indicator"),
    )
)]
pub async fn update_indicator(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateIndicatorRequest>,
) -> Result<Response, ApiError> {
    let indicator = EconomicIndicatorRepository::new(&state.db).update(
        id,
        req.value,
        req.period,
        req.source.map(Some),
    )?;
    Ok(response::ok(indicator))
}

/// Delete an indicator (admin).
#[utoipa::path(
    delete,
    path = "/v1/economic-indicators/{id}",
    tag = "Economic Indicators",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Indicator id")),
    responses(
        (status = 204, description = "Indicator deleted"),
        (status = 404, description = "No such indicator"),
    )
)]
pub async fn delete_indicator(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    EconomicIndicatorRepository::new(&state.db).delete(id)?;
    Ok(response::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_value_and_blank_period_reported() {
        let req = CreateIndicatorRequest {
            country_code: "USA".into(),
            indicator_type: IndicatorKind::Gdp,
            value: f64::NAN,
            period: "  ".into(),
            source: None,
        };
        let fields: Vec<String> = req
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["country_code", "value", "period"]);
    }

    #[test]
    fn kind_parses_from_snake_case() {
        let req: CreateIndicatorRequest = serde_json::from_str(
            r#"{"country_code":"US","indicator_type":"interest_rate","value":5.25,"period":"2026-Q1"}"#,
        )
        .unwrap();
        assert_eq!(req.indicator_type, IndicatorKind::InterestRate);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn negative_values_are_allowed() {
        // Trade balances go negative.
        let req = CreateIndicatorRequest {
            country_code: "US".into(),
            indicator_type: IndicatorKind::TradeBalance,
            value: -68.3,
            period: "2026-01".into(),
            source: Some("census".into()),
        };
        assert!(req.validate().is_ok());
    }
}

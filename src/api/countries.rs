// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Country reference data. Reads for any authenticated caller,
//! mutations admin-only by route policy.

use axum::{
    extract::State,
    response::Response,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::currencies::ActiveFilter;
use crate::error::ApiError;
use crate::response;
use crate::state::AppState;
use crate::storage::{Country, CountryRepository};
use crate::validate::{Checker, FieldError, Path, Query, Validate, ValidJson};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCountryRequest {
    pub code: String,
    pub name: String,
    pub currency_code: String,
    #[serde(default)]
    pub flag_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Validate for CreateCountryRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.exact_len("code", &self.code, 2);
        checker.required("name", &self.name);
        checker.exact_len("currency_code", &self.currency_code, 3);
        if let Some(url) = &self.flag_url {
            checker.url("flag_url", url);
        }
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCountryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub flag_url: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Validate for UpdateCountryRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        if let Some(name) = &self.name {
            checker.required("name", name);
        }
        if let Some(code) = &self.currency_code {
            checker.exact_len("currency_code", code, 3);
        }
        if let Some(url) = &self.flag_url {
            checker.url("flag_url", url);
        }
        checker.finish()
    }
}

/// List countries.
#[utoipa::path(
    get,
    path = "/v1/countries",
    tag = "Countries",
    security(("bearer" = [])),
    params(ActiveFilter),
    responses((status = 200, description = "Countries", body = [Country]))
)]
pub async fn list_countries(
    State(state): State<AppState>,
    Query(filter): Query<ActiveFilter>,
) -> Result<Response, ApiError> {
    let rows = CountryRepository::new(&state.db).list(!filter.include_inactive)?;
    Ok(response::ok(rows))
}

/// Create a country (admin).
#[utoipa::path(
    post,
    path = "/v1/countries",
    tag = "Countries",
    security(("bearer" = [])),
    request_body = CreateCountryRequest,
    responses(
        (status = 201, description = "Country created", body = Country),
        (status = 409, description = "Code already registered"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn create_country(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateCountryRequest>,
) -> Result<Response, ApiError> {
    let country = CountryRepository::new(&state.db).create(
        req.code,
        req.name,
        req.currency_code,
        req.flag_url,
        req.is_active,
    )?;
    Ok(response::created(country))
}

/// Fetch one country.
#[utoipa::path(
    get,
    path = "/v1/countries/{id}",
    tag = "Countries",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Country id")),
    responses(
        (status = 200, description = "Country", body = Country),
        (status = 404, description = "No such country"),
    )
)]
pub async fn get_country(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(response::ok(CountryRepository::new(&state.db).get(id)?))
}

/// Update a country (admin).
#[utoipa::path(
    put,
    path = "/v1/countries/{id}",
    tag = "Countries",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Country id")),
    request_body = UpdateCountryRequest,
    responses(
        (status = 200, description = "Updated country", body = Country),
        (status = 404, description = "No such country"),
    )
)]
pub async fn update_country(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateCountryRequest>,
) -> Result<Response, ApiError> {
    let country = CountryRepository::new(&state.db).update(
        id,
        req.name,
        req.currency_code,
        req.flag_url.map(Some),
        req.is_active,
    )?;
    Ok(response::ok(country))
}

/// Delete a country (admin).
#[utoipa::path(
    delete,
    path = "/v1/countries/{id}",
    tag = "Countries",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Country id")),
    responses(
        (status = 204, description = "Country deleted"),
        (status = 404, description = "No such country"),
    )
)]
pub async fn delete_country(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    CountryRepository::new(&state.db).delete(id)?;
    Ok(response::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_urls_are_checked_in_declaration_order() {
        let req = CreateCountryRequest {
            code: "DEU".into(),
            name: "".into(),
            currency_code: "EURO".into(),
            flag_url: Some("nope".into()),
            is_active: true,
        };
        let errors = req.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["code", "name", "currency_code", "flag_url"]);
    }
}

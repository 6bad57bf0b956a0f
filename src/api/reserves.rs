// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reserve holdings, reserve transactions and basket compositions.
//!
//! Reads are open to any authenticated caller so holders can audit the
//! backing; every mutation is admin-only by route policy.

use axum::{
    extract::State,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::response;
use crate::state::AppState;
use crate::storage::{
    AssetType, BasketComposition, Reserve, ReserveRepository, ReserveTransaction, ReserveTxKind,
    ReserveTxStatus,
};
use crate::validate::{Checker, FieldError, Path, Validate, ValidJson};

/// Weights must sum to 100 within this tolerance.
const WEIGHT_TOLERANCE: f64 = 0.01;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReserveRequest {
    pub asset_type: AssetType,
    pub amount: f64,
    #[serde(default)]
    pub custody_provider: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Validate for CreateReserveRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.non_negative("amount", self.amount);
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReserveRequest {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub custody_provider: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl Validate for UpdateReserveRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        if let Some(amount) = self.amount {
            checker.non_negative("amount", amount);
        }
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReserveTxRequest {
    pub transaction_type: ReserveTxKind,
    pub asset_type: AssetType,
    pub amount: f64,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Validate for CreateReserveTxRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.positive("amount", self.amount);
        if let Some(reason) = &self.reason {
            checker.max_len("reason", reason, 500);
        }
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReserveTxStatusRequest {
    pub status: ReserveTxStatus,
}

impl Validate for UpdateReserveTxStatusRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBasketRequest {
    pub gold_weight: f64,
    pub usd_weight: f64,
    pub eur_weight: f64,
    #[serde(default)]
    pub effective_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl Validate for CreateBasketRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.non_negative("gold_weight", self.gold_weight);
        checker.non_negative("usd_weight", self.usd_weight);
        checker.non_negative("eur_weight", self.eur_weight);
        let sum = self.gold_weight + self.usd_weight + self.eur_weight;
        checker.check(
            "gold_weight",
            (sum - 100.0).abs() <= WEIGHT_TOLERANCE,
            "weights must sum to 100",
        );
        checker.finish()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReserveTotal {
    pub asset_type: AssetType,
    pub total: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReserveOverview {
    pub reserves: Vec<Reserve>,
    pub totals: Vec<ReserveTotal>,
}

// ============================================================================
// Reserve Handlers
// ============================================================================

/// Reserve holdings with per-asset totals.
#[utoipa::path(
    get,
    path = "/v1/reserves",
    tag = "Reserves",
    security(("bearer" = [])),
    responses((status = 200, description = "Reserve overview", body = ReserveOverview))
)]
pub async fn list_reserves(State(state): State<AppState>) -> Result<Response, ApiError> {
    let repo = ReserveRepository::new(&state.db);
    let reserves = repo.list_reserves()?;
    let totals = repo
        .totals()?
        .into_iter()
        .map(|(asset_type, total)| ReserveTotal { asset_type, total })
        .collect();
    Ok(response::ok(ReserveOverview { reserves, totals }))
}

/// Register a reserve holding (admin).
#[utoipa::path(
    post,
    path = "/v1/reserves",
    tag = "Reserves",
    security(("bearer" = [])),
    request_body = CreateReserveRequest,
    responses(
        (status = 201, description = "Reserve registered", body = Reserve),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn create_reserve(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateReserveRequest>,
) -> Result<Response, ApiError> {
    let reserve = ReserveRepository::new(&state.db).create_reserve(
        req.asset_type,
        req.amount,
        req.custody_provider,
        req.location,
    )?;
    Ok(response::created(reserve))
}

/// Fetch one reserve holding.
#[utoipa::path(
    get,
    path = "/v1/reserves/{id}",
    tag = "Reserves",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Reserve id")),
    responses(
        (status = 200, description = "Reserve", body = Reserve),
        (status = 404, description = "No such reserve"),
    )
)]
pub async fn get_reserve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(response::ok(ReserveRepository::new(&state.db).get_reserve(id)?))
}

/// Update a reserve holding (admin).
#[utoipa::path(
    put,
    path = "/v1/reserves/{id}",
    tag = "Reserves",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Reserve id")),
    request_body = UpdateReserveRequest,
    responses(
        (status = 200, description = "Updated reserve", body = Reserve),
        (status = 404, description = "No such reserve"),
    )
)]
pub async fn update_reserve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateReserveRequest>,
) -> Result<Response, ApiError> {
    let reserve = ReserveRepository::new(&state.db).update_reserve(
        id,
        req.amount,
        req.custody_provider.map(Some),
        req.location.map(Some),
    )?;
    Ok(response::ok(reserve))
}

// ============================================================================
// Reserve Transaction Handlers
// ============================================================================

/// List reserve transactions.
#[utoipa::path(
    get,
    path = "/v1/reserves/transactions",
    tag = "Reserves",
    security(("bearer" = [])),
    responses((status = 200, description = "Reserve transactions", body = [ReserveTransaction]))
)]
pub async fn list_reserve_transactions(
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    Ok(response::ok(
        ReserveRepository::new(&state.db).list_transactions()?,
    ))
}

/// Record a reserve transaction (admin).
#[utoipa::path(
    post,
    path = "/v1/reserves/transactions",
    tag = "Reserves",
    security(("bearer" = [])),
    request_body = CreateReserveTxRequest,
    responses(
        (status = 201, description = "Reserve transaction recorded", body = ReserveTransaction),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn create_reserve_transaction(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidJson(req): ValidJson<CreateReserveTxRequest>,
) -> Result<Response, ApiError> {
    let tx = ReserveRepository::new(&state.db).create_transaction(
        req.transaction_type,
        req.asset_type,
        req.amount,
        req.reason,
        user.id,
    )?;
    tracing::info!(reserve_tx_id = %tx.id, "reserve transaction recorded");
    Ok(response::created(tx))
}

/// Advance a reserve transaction's status (admin).
#[utoipa::path(
    put,
    path = "/v1/reserves/transactions/{id}/status",
    tag = "Reserves",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Reserve transaction id")),
    request_body = UpdateReserveTxStatusRequest,
    responses(
        (status = 200, description = "Updated reserve transaction", body = ReserveTransaction),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "No such reserve transaction"),
    )
)]
pub async fn update_reserve_transaction_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateReserveTxStatusRequest>,
) -> Result<Response, ApiError> {
    let tx = ReserveRepository::new(&state.db).set_transaction_status(id, req.status)?;
    Ok(response::ok(tx))
}

// ============================================================================
// Basket Handlers
// ============================================================================

/// The currently effective basket composition.
#[utoipa::path(
    get,
    path = "/v1/reserves/basket",
    tag = "Reserves",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Current basket", body = BasketComposition),
        (status = 404, description = "No composition recorded yet"),
    )
)]
pub async fn current_basket(State(state): State<AppState>) -> Result<Response, ApiError> {
    let basket = ReserveRepository::new(&state.db)
        .current_basket()?
        .ok_or_else(|| ApiError::not_found("No basket composition recorded"))?;
    Ok(response::ok(basket))
}

/// Full composition history, most recent first.
#[utoipa::path(
    get,
    path = "/v1/reserves/basket/history",
    tag = "Reserves",
    security(("bearer" = [])),
    responses((status = 200, description = "Composition history", body = [BasketComposition]))
)]
pub async fn basket_history(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(response::ok(
        ReserveRepository::new(&state.db).basket_history()?,
    ))
}

/// Record a new basket composition (admin).
#[utoipa::path(
    post,
    path = "/v1/reserves/basket",
    tag = "Reserves",
    security(("bearer" = [])),
    request_body = CreateBasketRequest,
    responses(
        (status = 201, description = "Composition recorded", body = BasketComposition),
        (status = 422, description = "Weights do not sum to 100"),
    )
)]
pub async fn create_basket(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidJson(req): ValidJson<CreateBasketRequest>,
) -> Result<Response, ApiError> {
    let basket = ReserveRepository::new(&state.db).create_basket(
        req.gold_weight,
        req.usd_weight,
        req.eur_weight,
        req.effective_date.unwrap_or_else(Utc::now),
        req.reason,
        user.id,
    )?;
    tracing::info!(basket_id = %basket.id, "basket composition recorded");
    Ok(response::created(basket))
}

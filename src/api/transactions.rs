// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction endpoints.
//!
//! Users create and view transactions against their own wallets. The
//! admin-only operations (update, delete, process) use the `AdminOnly`
//! extractor because the `/v1/transactions` prefix is otherwise open to
//! any authenticated caller.

use axum::{
    extract::State,
    response::Response,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{AdminOnly, Auth};
use crate::error::ApiError;
use crate::pagination::{slice_page, PageQuery};
use crate::response;
use crate::state::AppState;
use crate::storage::{
    TransactionRecord, TransactionRepository, TxKind, TxStatus, WalletRepository,
};
use crate::validate::{Checker, FieldError, Path, Query, Validate, ValidJson};

const DEFAULT_PAGE_SIZE: u64 = 50;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    #[serde(default)]
    pub from_wallet_id: Option<Uuid>,
    #[serde(default)]
    pub to_wallet_id: Option<Uuid>,
    pub amount: f64,
    #[serde(default)]
    pub fee: f64,
    pub transaction_type: TxKind,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for CreateTransactionRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.positive("amount", self.amount);
        checker.non_negative("fee", self.fee);
        checker.check(
            "to_wallet_id",
            self.from_wallet_id.is_some() || self.to_wallet_id.is_some(),
            "at least one wallet must be given",
        );
        if let Some(desc) = &self.description {
            checker.max_len("description", desc, 500);
        }
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTransactionRequest {
    #[serde(default)]
    pub status: Option<TxStatus>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for UpdateTransactionRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        if let Some(desc) = &self.description {
            checker.max_len("description", desc, 500);
        }
        checker.finish()
    }
}

/// List filters. `status` and foreign `user_id` are admin-only.
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionFilter {
    #[serde(default)]
    pub wallet_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<TxStatus>,
    /// 1-based page number (default 1).
    #[serde(default)]
    pub page: Option<u64>,
    /// Page size.
    #[serde(default)]
    pub limit: Option<u64>,
}

// ============================================================================
// Handlers
// ============================================================================

/// List transactions visible to the caller.
#[utoipa::path(
    get,
    path = "/v1/transactions",
    tag = "Transactions",
    security(("bearer" = [])),
    params(TransactionFilter),
    responses(
        (status = 200, description = "Paginated transactions", body = [TransactionRecord]),
        (status = 403, description = "Filter requires admin access"),
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Auth(user): Auth,
    Query(filter): Query<TransactionFilter>,
) -> Result<Response, ApiError> {
    if filter.status.is_some() && !user.is_admin() {
        return Err(ApiError::forbidden("Status filter requires admin access"));
    }
    if let Some(target) = filter.user_id {
        if target != user.id && !user.is_admin() {
            return Err(ApiError::forbidden(
                "Cannot list another user's transactions",
            ));
        }
    }

    let wallets = WalletRepository::new(&state.db);
    let repo = TransactionRepository::new(&state.db);

    let mut rows = match (user.is_admin(), filter.user_id) {
        (true, None) => repo.list()?,
        (_, Some(target)) => {
            let ids: Vec<Uuid> = wallets.list_for_user(target)?.iter().map(|w| w.id).collect();
            repo.list_for_wallets(&ids)?
        }
        (false, None) => {
            let ids: Vec<Uuid> = wallets.list_for_user(user.id)?.iter().map(|w| w.id).collect();
            repo.list_for_wallets(&ids)?
        }
    };

    if let Some(wallet_id) = filter.wallet_id {
        rows.retain(|t| {
            t.from_wallet_id == Some(wallet_id) || t.to_wallet_id == Some(wallet_id)
        });
    }
    if let Some(status) = filter.status {
        rows.retain(|t| t.status == status);
    }

    let page = PageQuery {
        page: filter.page,
        limit: filter.limit,
    }
    .resolve(DEFAULT_PAGE_SIZE);
    let (rows, total) = slice_page(rows, page);
    Ok(response::paginated(rows, page.page, page.limit, total))
}

/// Record a new pending transaction.
#[utoipa::path(
    post,
    path = "/v1/transactions",
    tag = "Transactions",
    security(("bearer" = [])),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = TransactionRecord),
        (status = 400, description = "Insufficient balance"),
        (status = 403, description = "Not the source wallet owner"),
        (status = 404, description = "Referenced wallet missing"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn create_transaction(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidJson(req): ValidJson<CreateTransactionRequest>,
) -> Result<Response, ApiError> {
    // Spending from a wallet requires owning it (or being admin)
    if let Some(from) = req.from_wallet_id {
        let wallet = WalletRepository::new(&state.db).get(from)?;
        if wallet.user_id != user.id && !user.is_admin() {
            return Err(ApiError::forbidden("Not the source wallet owner"));
        }
        if !wallet.is_active {
            return Err(ApiError::bad_request("Source wallet is inactive"));
        }
    }

    let record = TransactionRepository::new(&state.db).create(
        req.from_wallet_id,
        req.to_wallet_id,
        req.amount,
        req.fee,
        req.transaction_type,
        req.description,
    )?;
    tracing::info!(transaction_id = %record.id, amount = record.amount, "transaction recorded");
    Ok(response::created(record))
}

/// Fetch one transaction (involved party or admin).
#[utoipa::path(
    get,
    path = "/v1/transactions/{id}",
    tag = "Transactions",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction", body = TransactionRecord),
        (status = 403, description = "Not involved in this transaction"),
        (status = 404, description = "No such transaction"),
    )
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let record = TransactionRepository::new(&state.db).get(id)?;
    if !user.is_admin() {
        let wallets = WalletRepository::new(&state.db);
        let own: Vec<Uuid> = wallets.list_for_user(user.id)?.iter().map(|w| w.id).collect();
        let involved = record.from_wallet_id.map(|w| own.contains(&w)).unwrap_or(false)
            || record.to_wallet_id.map(|w| own.contains(&w)).unwrap_or(false);
        if !involved {
            return Err(ApiError::forbidden("Not involved in this transaction"));
        }
    }
    Ok(response::ok(record))
}

/// Update status / description (admin).
#[utoipa::path(
    put,
    path = "/v1/transactions/{id}",
    tag = "Transactions",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Transaction id")),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Updated transaction", body = TransactionRecord),
        (status = 404, description = "No such transaction"),
    )
)]
pub async fn update_transaction(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateTransactionRequest>,
) -> Result<Response, ApiError> {
    let record = TransactionRepository::new(&state.db).update(
        id,
        req.status,
        req.description.map(Some),
    )?;
    Ok(response::ok(record))
}

/// Delete a transaction record (admin).
#[utoipa::path(
    delete,
    path = "/v1/transactions/{id}",
    tag = "Transactions",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Transaction id")),
    responses(
        (status = 204, description = "Transaction deleted"),
        (status = 404, description = "No such transaction"),
    )
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    TransactionRepository::new(&state.db).delete(id)?;
    Ok(response::no_content())
}

/// Settle a pending transfer atomically (admin).
#[utoipa::path(
    post,
    path = "/v1/transactions/{id}/process",
    tag = "Transactions",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction settled", body = TransactionRecord),
        (status = 400, description = "Not pending or insufficient funds"),
        (status = 404, description = "No such transaction"),
    )
)]
pub async fn process_transaction(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let record = TransactionRepository::new(&state.db).process(id)?;
    tracing::info!(
        transaction_id = %id,
        admin_id = %admin.id,
        "transaction settled"
    );
    Ok(response::ok(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_requires_a_wallet_and_positive_amount() {
        let req = CreateTransactionRequest {
            from_wallet_id: None,
            to_wallet_id: None,
            amount: -1.0,
            fee: -0.5,
            transaction_type: TxKind::Transfer,
            description: None,
        };
        let errors = req.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["amount", "fee", "to_wallet_id"]);
    }

    #[test]
    fn fee_defaults_to_zero() {
        let req: CreateTransactionRequest = serde_json::from_str(
            r#"{"to_wallet_id":"00000000-0000-0000-0000-000000000001",
                "amount":5.0,"transaction_type":"deposit"}"#,
        )
        .unwrap();
        assert_eq!(req.fee, 0.0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn non_finite_amounts_are_rejected() {
        let req = CreateTransactionRequest {
            from_wallet_id: None,
            to_wallet_id: Some(Uuid::new_v4()),
            amount: f64::NAN,
            fee: 0.0,
            transaction_type: TxKind::Transfer,
            description: None,
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors[0].field, "amount");
    }
}

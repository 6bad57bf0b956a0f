// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet endpoints.
//!
//! Users see and create their own wallets; admins see everything and own
//! the activate / deactivate / delete operations.

use axum::{
    extract::State,
    response::Response,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AdminOnly, Auth};
use crate::crypto;
use crate::error::ApiError;
use crate::pagination::{slice_page, PageQuery};
use crate::response;
use crate::state::AppState;
use crate::storage::{WalletRepository, WalletResponse};
use crate::validate::{Checker, FieldError, Path, Query, Validate, ValidJson};

const DEFAULT_PAGE_SIZE: u64 = 20;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWalletRequest {
    /// Externally-held key. When omitted, the platform generates a
    /// keypair and keeps the secret encrypted at rest.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Wallet owner; admins only, defaults to the caller.
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

impl Validate for CreateWalletRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        if let Some(key) = &self.public_key {
            checker.min_len("public_key", key, 8);
            checker.max_len("public_key", key, 128);
        }
        checker.finish()
    }
}

/// List wallets: the caller's own, or every wallet for admins.
#[utoipa::path(
    get,
    path = "/v1/wallets",
    tag = "Wallets",
    security(("bearer" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated wallet list", body = [WalletResponse]),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn list_wallets(
    State(state): State<AppState>,
    Auth(user): Auth,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let page = query.resolve(DEFAULT_PAGE_SIZE);
    let repo = WalletRepository::new(&state.db);
    let rows = if user.is_admin() {
        repo.list()?
    } else {
        repo.list_for_user(user.id)?
    };
    let (rows, total) = slice_page(rows, page);
    let rows: Vec<WalletResponse> = rows.into_iter().map(Into::into).collect();
    Ok(response::paginated(rows, page.page, page.limit, total))
}

/// Create a wallet.
#[utoipa::path(
    post,
    path = "/v1/wallets",
    tag = "Wallets",
    security(("bearer" = [])),
    request_body = CreateWalletRequest,
    responses(
        (status = 201, description = "Wallet created", body = WalletResponse),
        (status = 400, description = "Key generation unavailable"),
        (status = 403, description = "Cannot create wallets for other users"),
    )
)]
pub async fn create_wallet(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidJson(req): ValidJson<CreateWalletRequest>,
) -> Result<Response, ApiError> {
    let owner = match req.user_id {
        Some(other) if other != user.id => {
            if !user.is_admin() {
                return Err(ApiError::forbidden(
                    "Cannot create wallets for other users",
                ));
            }
            other
        }
        _ => user.id,
    };

    let (public_key, encrypted_secret) = match req.public_key {
        Some(key) => (key, None),
        None => {
            let Some(encryption_key) = state.encryption_key else {
                return Err(ApiError::bad_request(
                    "Wallet key generation is not configured",
                ));
            };
            let (public_key, secret) = crypto::generate_keypair()
                .map_err(|err| ApiError::internal(err.to_string()))?;
            let encrypted = crypto::encrypt_secret(&secret, &encryption_key)
                .map_err(|err| ApiError::internal(err.to_string()))?;
            (public_key, Some(encrypted))
        }
    };

    let wallet = WalletRepository::new(&state.db).create(owner, public_key, encrypted_secret)?;
    tracing::info!(wallet_id = %wallet.id, user_id = %owner, "wallet created");
    Ok(response::created(WalletResponse::from(wallet)))
}

/// Fetch one wallet (owner or admin).
#[utoipa::path(
    get,
    path = "/v1/wallets/{id}",
    tag = "Wallets",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Wallet id")),
    responses(
        (status = 200, description = "Wallet", body = WalletResponse),
        (status = 403, description = "Not the wallet owner"),
        (status = 404, description = "No such wallet"),
    )
)]
pub async fn get_wallet(
    State(state): State<AppState>,
    Auth(user): Auth,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let wallet = WalletRepository::new(&state.db).get(id)?;
    if wallet.user_id != user.id && !user.is_admin() {
        return Err(ApiError::forbidden("Not the wallet owner"));
    }
    Ok(response::ok(WalletResponse::from(wallet)))
}

/// Reactivate a wallet (admin).
#[utoipa::path(
    put,
    path = "/v1/wallets/{id}/activate",
    tag = "Wallets",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Wallet id")),
    responses(
        (status = 200, description = "Wallet activated", body = WalletResponse),
        (status = 404, description = "No such wallet"),
    )
)]
pub async fn activate_wallet(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let wallet = WalletRepository::new(&state.db).set_active(id, true)?;
    Ok(response::ok(WalletResponse::from(wallet)))
}

/// Deactivate a wallet (admin).
#[utoipa::path(
    put,
    path = "/v1/wallets/{id}/deactivate",
    tag = "Wallets",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Wallet id")),
    responses(
        (status = 200, description = "Wallet deactivated", body = WalletResponse),
        (status = 404, description = "No such wallet"),
    )
)]
pub async fn deactivate_wallet(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let wallet = WalletRepository::new(&state.db).set_active(id, false)?;
    Ok(response::ok(WalletResponse::from(wallet)))
}

/// Delete a wallet (admin). Refused while a balance remains.
#[utoipa::path(
    delete,
    path = "/v1/wallets/{id}",
    tag = "Wallets",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Wallet id")),
    responses(
        (status = 204, description = "Wallet deleted"),
        (status = 400, description = "Wallet still holds funds"),
        (status = 404, description = "No such wallet"),
    )
)]
pub async fn delete_wallet(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = WalletRepository::new(&state.db);
    let wallet = repo.get(id)?;
    if wallet.balance != 0.0 {
        return Err(ApiError::bad_request("Wallet still holds funds"));
    }
    repo.delete(id)?;
    tracing::info!(wallet_id = %id, "wallet deleted");
    Ok(response::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplied_public_key_is_length_checked() {
        let req = CreateWalletRequest {
            public_key: Some("short".into()),
            user_id: None,
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors[0].field, "public_key");
    }

    #[test]
    fn omitted_public_key_is_valid() {
        let req: CreateWalletRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(req.public_key.is_none());
    }
}

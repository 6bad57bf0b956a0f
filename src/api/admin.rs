// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only endpoints: platform statistics, per-user activity and
//! account suspension.

use axum::{
    extract::State,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::response;
use crate::state::AppState;
use crate::storage::{
    KycDocument, KycRepository, ProfileRepository, ProfileResponse, TransactionRecord,
    TransactionRepository, WalletRepository, WalletResponse,
};
use crate::validate::Path;

const ACTIVITY_TRANSACTION_LIMIT: usize = 50;

// ============================================================================
// Response Types
// ============================================================================

/// Platform-wide statistics.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlatformStats {
    pub total_users: u64,
    pub active_users: u64,
    pub total_wallets: u64,
    pub active_wallets: u64,
    pub total_transactions: u64,
    pub pending_kyc_documents: u64,
    pub timestamp: DateTime<Utc>,
}

/// Everything an admin needs to review one account.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserActivity {
    pub profile: ProfileResponse,
    pub wallets: Vec<WalletResponse>,
    /// Most recent transactions across the user's wallets.
    pub transactions: Vec<TransactionRecord>,
    pub kyc_documents: Vec<KycDocument>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuspendResponse {
    pub profile: ProfileResponse,
    /// Wallets deactivated alongside the account.
    pub wallets_deactivated: u64,
}

// ============================================================================
// Handlers
// ============================================================================

/// Platform statistics.
#[utoipa::path(
    get,
    path = "/v1/admin/stats",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Platform statistics", body = PlatformStats),
        (status = 403, description = "Admin access required"),
    )
)]
pub async fn platform_stats(State(state): State<AppState>) -> Result<Response, ApiError> {
    let profiles = ProfileRepository::new(&state.db);
    let wallets = WalletRepository::new(&state.db);

    let all_profiles = profiles.list()?;
    let all_wallets = wallets.list()?;

    Ok(response::ok(PlatformStats {
        total_users: all_profiles.len() as u64,
        active_users: all_profiles.iter().filter(|p| p.is_active).count() as u64,
        total_wallets: all_wallets.len() as u64,
        active_wallets: all_wallets.iter().filter(|w| w.is_active).count() as u64,
        total_transactions: TransactionRepository::new(&state.db).count()?,
        pending_kyc_documents: KycRepository::new(&state.db).count_pending()?,
        timestamp: Utc::now(),
    }))
}

/// Activity report for one user.
#[utoipa::path(
    get,
    path = "/v1/admin/users/{id}/activity",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User activity", body = UserActivity),
        (status = 404, description = "No such user"),
    )
)]
pub async fn user_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let profile = ProfileRepository::new(&state.db).get(id)?;
    let wallets = WalletRepository::new(&state.db).list_for_user(id)?;
    let wallet_ids: Vec<Uuid> = wallets.iter().map(|w| w.id).collect();

    let mut transactions =
        TransactionRepository::new(&state.db).list_for_wallets(&wallet_ids)?;
    transactions.truncate(ACTIVITY_TRANSACTION_LIMIT);

    Ok(response::ok(UserActivity {
        profile: profile.into(),
        wallets: wallets.into_iter().map(Into::into).collect(),
        transactions,
        kyc_documents: KycRepository::new(&state.db).list_for_user(id)?,
    }))
}

/// Suspend a user: deactivates the profile and every active wallet.
#[utoipa::path(
    post,
    path = "/v1/admin/users/{id}/suspend",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User suspended", body = SuspendResponse),
        (status = 404, description = "No such user"),
    )
)]
pub async fn suspend_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let profile = ProfileRepository::new(&state.db).set_active(id, false)?;
    let wallets_deactivated = WalletRepository::new(&state.db).deactivate_for_user(id)?;
    tracing::warn!(user_id = %id, wallets_deactivated, "user suspended");

    Ok(response::ok(SuspendResponse {
        profile: profile.into(),
        wallets_deactivated,
    }))
}

/// Reactivate a suspended user. Wallets stay inactive until reactivated
/// individually.
#[utoipa::path(
    post,
    path = "/v1/admin/users/{id}/activate",
    tag = "Admin",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User reactivated", body = ProfileResponse),
        (status = 404, description = "No such user"),
    )
)]
pub async fn activate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let profile = ProfileRepository::new(&state.db).set_active(id, true)?;
    tracing::info!(user_id = %id, "user reactivated");
    Ok(response::ok(ProfileResponse::from(profile)))
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Health and readiness probes. Unauthenticated by policy.

use axum::{extract::State, response::Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::response;
use crate::state::AppState;
use crate::storage::ProfileRepository;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Liveness: the process is up.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn health() -> Response {
    response::ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness probe alias for orchestrators.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
pub async fn live() -> Response {
    health().await
}

/// Readiness: the database answers a read.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 500, description = "Storage unavailable"),
    )
)]
pub async fn ready(State(state): State<AppState>) -> Result<Response, ApiError> {
    ProfileRepository::new(&state.db).count()?;
    Ok(response::ok(HealthResponse {
        status: "ready",
        version: env!("CARGO_PKG_VERSION"),
    }))
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password login. Issues the HS256 session token the route guard
//! verifies on every protected request.
//!
//! Every credential failure answers with the same 401 so the endpoint
//! leaks nothing about which accounts exist.

use axum::{extract::State, response::Response};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::SessionClaims;
use crate::crypto;
use crate::error::ApiError;
use crate::response;
use crate::state::AppState;
use crate::storage::{ProfileRepository, ProfileResponse};
use crate::validate::{Checker, FieldError, Validate, ValidJson};

/// Session lifetime: 24 hours.
const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.required("email", &self.email);
        checker.required("password", &self.password);
        checker.finish()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: ProfileResponse,
}

/// Exchange credentials for a session token.
#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 401, description = "Unknown account, wrong password or suspended user"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = crypto::normalize_email(&req.email);
    let profile = ProfileRepository::new(&state.db)
        .find_by_email(&email)?
        .ok_or(ApiError::Unauthorized)?;

    let digest = profile.password_digest.as_deref().ok_or(ApiError::Unauthorized)?;
    if !crypto::verify_password(&req.password, digest) || !profile.is_active {
        return Err(ApiError::Unauthorized);
    }

    let secret = state
        .auth
        .secret
        .as_deref()
        .ok_or_else(|| ApiError::internal("no session signing secret configured"))?;

    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: profile.id.to_string(),
        email: profile.email.clone(),
        iat: now,
        exp: now + SESSION_TTL_SECS,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|err| ApiError::internal(err.to_string()))?;

    tracing::info!(user_id = %profile.id, "login");
    Ok(response::ok(LoginResponse {
        token,
        user: profile.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credentials_are_rejected() {
        let req = LoginRequest {
            email: " ".into(),
            password: String::new(),
        };
        let fields: Vec<String> = req
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["email", "password"]);
    }

    #[test]
    fn filled_credentials_pass_validation() {
        let req = LoginRequest {
            email: "user@example.com".into(),
            password: "longenough".into(),
        };
        assert!(req.validate().is_ok());
    }
}

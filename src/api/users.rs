// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User management endpoints.
//!
//! `/v1/users/me` is open to any authenticated caller; everything else on
//! the prefix is admin-only via the route policy table.

use axum::{
    extract::State,
    response::Response,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{Auth, Role};
use crate::crypto;
use crate::error::ApiError;
use crate::pagination::{slice_page, PageQuery};
use crate::response;
use crate::state::AppState;
use crate::storage::{ProfileRepository, ProfileResponse};
use crate::validate::{Checker, FieldError, Path, Query, Validate, ValidJson};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MIN_PASSWORD_LEN: usize = 8;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.email("email", &self.email);
        checker.min_len("password", &self.password, MIN_PASSWORD_LEN);
        if let Some(name) = &self.full_name {
            checker.max_len("full_name", name, 200);
        }
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl Validate for UpdateUserRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        if let Some(email) = &self.email {
            checker.email("email", email);
        }
        if let Some(name) = &self.full_name {
            checker.max_len("full_name", name, 200);
        }
        checker.finish()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// The current caller's own profile.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller profile", body = ProfileResponse),
        (status = 401, description = "Not authenticated"),
    )
)]
pub async fn me(State(state): State<AppState>, Auth(user): Auth) -> Result<Response, ApiError> {
    let profile = ProfileRepository::new(&state.db).get(user.id)?;
    Ok(response::ok(ProfileResponse::from(profile)))
}

/// List all users (admin).
#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    security(("bearer" = [])),
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated user list", body = [ProfileResponse]),
        (status = 403, description = "Admin access required"),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let page = query.resolve(DEFAULT_PAGE_SIZE);
    let rows = ProfileRepository::new(&state.db).list()?;
    let (rows, total) = slice_page(rows, page);
    let rows: Vec<ProfileResponse> = rows.into_iter().map(Into::into).collect();
    Ok(response::paginated(rows, page.page, page.limit, total))
}

/// Create a user (admin).
#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    security(("bearer" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ProfileResponse),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> Result<Response, ApiError> {
    let email = crypto::normalize_email(&req.email);
    let digest = crypto::password_digest(&req.password)
        .map_err(|err| ApiError::internal(err.to_string()))?;

    let profile = ProfileRepository::new(&state.db).create(
        email,
        req.full_name,
        req.phone,
        req.role,
        Some(digest),
    )?;
    tracing::info!(user_id = %profile.id, "user created");
    Ok(response::created(ProfileResponse::from(profile)))
}

/// Fetch one user (admin).
#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = ProfileResponse),
        (status = 404, description = "No such user"),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let profile = ProfileRepository::new(&state.db).get(id)?;
    Ok(response::ok(ProfileResponse::from(profile)))
}

/// Update a user (admin).
#[utoipa::path(
    put,
    path = "/v1/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = ProfileResponse),
        (status = 404, description = "No such user"),
        (status = 409, description = "Email already in use"),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> Result<Response, ApiError> {
    let profile = ProfileRepository::new(&state.db).update(
        id,
        req.email.map(|e| crypto::normalize_email(&e)),
        req.full_name.map(Some),
        req.phone.map(Some),
        req.role,
        req.is_active,
    )?;
    Ok(response::ok(ProfileResponse::from(profile)))
}

/// Delete a user (admin).
#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    tag = "Users",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "No such user"),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    ProfileRepository::new(&state.db).delete(id)?;
    tracing::info!(user_id = %id, "user deleted");
    Ok(response::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_collects_all_field_errors() {
        let req = CreateUserRequest {
            email: "not-an-email".into(),
            password: "short".into(),
            full_name: None,
            phone: None,
            role: Role::User,
        };
        let errors = req.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password"]);
    }

    #[test]
    fn role_defaults_to_user() {
        let req: CreateUserRequest = serde_json::from_str(
            r#"{"email":"a@example.com","password":"longenough"}"#,
        )
        .unwrap();
        assert_eq!(req.role, Role::User);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_request_allows_empty_body() {
        let req: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(req.email.is_none());
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fine-grained role and permission management. Admin-only by route
//! policy.

use axum::{
    extract::State,
    response::Response,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::response;
use crate::state::AppState;
use crate::storage::{RoleRecord, RoleRepository};
use crate::validate::{Checker, FieldError, Path, Validate, ValidJson};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Validate for CreateRoleRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.required("name", &self.name);
        checker.max_len("name", &self.name, 64);
        for (i, permission) in self.permissions.iter().enumerate() {
            checker.check(
                &format!("permissions[{i}]"),
                !permission.trim().is_empty(),
                "must not be blank",
            );
        }
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

impl Validate for UpdateRoleRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        if let Some(name) = &self.name {
            checker.required("name", name);
            checker.max_len("name", name, 64);
        }
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddPermissionRequest {
    pub permission: String,
}

impl Validate for AddPermissionRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.required("permission", &self.permission);
        checker.finish()
    }
}

/// List all roles.
#[utoipa::path(
    get,
    path = "/v1/roles",
    tag = "Roles",
    security(("bearer" = [])),
    responses((status = 200, description = "Roles", body = [RoleRecord]))
)]
pub async fn list_roles(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(response::ok(RoleRepository::new(&state.db).list()?))
}

/// Create a role.
#[utoipa::path(
    post,
    path = "/v1/roles",
    tag = "Roles",
    security(("bearer" = [])),
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = RoleRecord),
        (status = 409, description = "Name already taken"),
    )
)]
pub async fn create_role(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateRoleRequest>,
) -> Result<Response, ApiError> {
    let role =
        RoleRepository::new(&state.db).create(req.name, req.description, req.permissions)?;
    Ok(response::created(role))
}

/// Fetch one role.
#[utoipa::path(
    get,
    path = "/v1/roles/{id}",
    tag = "Roles",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 200, description = "Role", body = RoleRecord),
        (status = 404, description = "No such role"),
    )
)]
pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(response::ok(RoleRepository::new(&state.db).get(id)?))
}

/// Update a role.
#[utoipa::path(
    put,
    path = "/v1/roles/{id}",
    tag = "Roles",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated role", body = RoleRecord),
        (status = 404, description = "No such role"),
        (status = 409, description = "Name already taken"),
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateRoleRequest>,
) -> Result<Response, ApiError> {
    let role = RoleRepository::new(&state.db).update(
        id,
        req.name,
        req.description.map(Some),
        req.permissions,
    )?;
    Ok(response::ok(role))
}

/// Delete a role.
#[utoipa::path(
    delete,
    path = "/v1/roles/{id}",
    tag = "Roles",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 404, description = "No such role"),
    )
)]
pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    RoleRepository::new(&state.db).delete(id)?;
    Ok(response::no_content())
}

/// Grant a permission to a role. Idempotent.
#[utoipa::path(
    post,
    path = "/v1/roles/{id}/permissions",
    tag = "Roles",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = AddPermissionRequest,
    responses(
        (status = 200, description = "Updated role", body = RoleRecord),
        (status = 404, description = "No such role"),
    )
)]
pub async fn add_permission(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<AddPermissionRequest>,
) -> Result<Response, ApiError> {
    let role = RoleRepository::new(&state.db).add_permission(id, req.permission)?;
    Ok(response::ok(role))
}

/// Revoke a permission from a role. Idempotent.
#[utoipa::path(
    delete,
    path = "/v1/roles/{id}/permissions/{permission}",
    tag = "Roles",
    security(("bearer" = [])),
    params(
        ("id" = Uuid, Path, description = "Role id"),
        ("permission" = String, Path, description = "Permission string"),
    ),
    responses(
        (status = 200, description = "Updated role", body = RoleRecord),
        (status = 404, description = "No such role"),
    )
)]
pub async fn remove_permission(
    State(state): State<AppState>,
    Path((id, permission)): Path<(Uuid, String)>,
) -> Result<Response, ApiError> {
    let role = RoleRepository::new(&state.db).remove_permission(id, &permission)?;
    Ok(response::ok(role))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_default_to_empty() {
        let req: CreateRoleRequest =
            serde_json::from_str(r#"{"name":"auditor"}"#).unwrap();
        assert!(req.permissions.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_permissions_are_flagged_by_index() {
        let req = CreateRoleRequest {
            name: "support".into(),
            description: None,
            permissions: vec!["users:read".into(), "  ".into()],
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors[0].field, "permissions[1]");
    }
}

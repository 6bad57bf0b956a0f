// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! News category endpoints. Reads are open to any authenticated caller;
//! mutations are admin operations via the route policy.

use axum::{extract::State, response::Response};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::response;
use crate::state::AppState;
use crate::storage::{NewsCategory, NewsCategoryRepository};
use crate::validate::{Checker, FieldError, Path, Validate, ValidJson};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNewsCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub slug: String,
}

impl Validate for CreateNewsCategoryRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.min_len("name", &self.name, 2);
        checker.min_len("slug", &self.slug, 2);
        checker.check(
            "slug",
            self.slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "must contain only lowercase letters, digits and hyphens",
        );
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNewsCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl Validate for UpdateNewsCategoryRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        if let Some(name) = &self.name {
            checker.min_len("name", name, 2);
        }
        if let Some(slug) = &self.slug {
            checker.min_len("slug", slug, 2);
            checker.check(
                "slug",
                slug.chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "must contain only lowercase letters, digits and hyphens",
            );
        }
        checker.finish()
    }
}

/// List news categories.
#[utoipa::path(
    get,
    path = "/v1/news-categories",
    tag = "News",
    security(("bearer" = [])),
    responses((status = 200, description = "Categories", body = [NewsCategory]))
)]
pub async fn list_categories(State(state): State<AppState>) -> Result<Response, ApiError> {
    Ok(response::ok(NewsCategoryRepository::new(&state.db).list()?))
}

/// Create a news category (admin).
#[utoipa::path(
    post,
    path = "/v1/news-categories",
    tag = "News",
    security(("bearer" = [])),
    request_body = CreateNewsCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = NewsCategory),
        (status = 409, description = "Slug already in use"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateNewsCategoryRequest>,
) -> Result<Response, ApiError> {
    let category =
        NewsCategoryRepository::new(&state.db).create(req.name, req.description, req.slug)?;
    Ok(response::created(category))
}

/// Fetch one category.
#[utoipa::path(
    get,
    path = "/v1/news-categories/{id}",
    tag = "News",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = NewsCategory),
        (status = 404, description = "No such category"),
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(response::ok(NewsCategoryRepository::new(&state.db).get(id)?))
}

/// Update a category (admin).
#[utoipa::path(
    put,
    path = "/v1/news-categories/{id}",
    tag = "News",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = UpdateNewsCategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = NewsCategory),
        (status = 404, description = "No such category"),
        (status = 409, description = "Slug already in use"),
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateNewsCategoryRequest>,
) -> Result<Response, ApiError> {
    let category = NewsCategoryRepository::new(&state.db).update(
        id,
        req.name,
        req.description.map(Some),
        req.slug,
    )?;
    Ok(response::ok(category))
}

/// Delete a category (admin).
#[utoipa::path(
    delete,
    path = "/v1/news-categories/{id}",
    tag = "News",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "No such category"),
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    NewsCategoryRepository::new(&state.db).delete(id)?;
    Ok(response::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_shape_is_enforced() {
        let req = CreateNewsCategoryRequest {
            name: "Markets".into(),
            description: None,
            slug: "Not A Slug".into(),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "slug");
    }

    #[test]
    fn short_name_and_slug_both_reported() {
        let req = CreateNewsCategoryRequest {
            name: "x".into(),
            description: None,
            slug: "y".into(),
        };
        let fields: Vec<String> = req
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["name", "slug"]);
    }

    #[test]
    fn valid_category_passes() {
        let req = CreateNewsCategoryRequest {
            name: "Monetary Policy".into(),
            description: Some("Central bank news".into()),
            slug: "monetary-policy".into(),
        };
        assert!(req.validate().is_ok());
    }
}

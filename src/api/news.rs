// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! News article endpoints.
//!
//! Anyone authenticated can read published articles; drafts are only
//! visible to admins. Authoring, publishing and deletion are admin
//! operations via the route policy.

use axum::{extract::State, response::Response};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::Auth;
use crate::error::ApiError;
use crate::pagination::{slice_page, PageQuery};
use crate::response;
use crate::state::AppState;
use crate::storage::{NewsArticle, NewsRepository};
use crate::validate::{Checker, FieldError, Path, Query, Validate, ValidJson};

const DEFAULT_PAGE_SIZE: u64 = 20;
const MIN_TITLE_LEN: usize = 5;
const MIN_CONTENT_LEN: usize = 20;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNewsRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Validate for CreateNewsRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.min_len("title", &self.title, MIN_TITLE_LEN);
        checker.min_len("content", &self.content, MIN_CONTENT_LEN);
        if let Some(url) = &self.image_url {
            checker.url("image_url", url);
        }
        for (i, tag) in self.tags.iter().enumerate() {
            checker.check(&format!("tags[{i}]"), !tag.trim().is_empty(), "is blank");
        }
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateNewsRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl Validate for UpdateNewsRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        if let Some(title) = &self.title {
            checker.min_len("title", title, MIN_TITLE_LEN);
        }
        if let Some(content) = &self.content {
            checker.min_len("content", content, MIN_CONTENT_LEN);
        }
        if let Some(url) = &self.image_url {
            checker.url("image_url", url);
        }
        checker.finish()
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct NewsFilter {
    /// Restrict to published articles. Non-admins are always restricted.
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// List news articles.
#[utoipa::path(
    get,
    path = "/v1/news",
    tag = "News",
    security(("bearer" = [])),
    params(NewsFilter),
    responses((status = 200, description = "Articles, newest first", body = [NewsArticle]))
)]
pub async fn list_news(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(filter): Query<NewsFilter>,
) -> Result<Response, ApiError> {
    // Drafts are admin-only; everyone else gets the published feed no
    // matter what they ask for.
    let published_only = if user.is_admin() {
        filter.published.unwrap_or(false)
    } else {
        true
    };
    let rows = NewsRepository::new(&state.db).list(published_only, filter.category_id)?;

    let page = PageQuery {
        page: filter.page,
        limit: filter.limit,
    }
    .resolve(DEFAULT_PAGE_SIZE);
    let (rows, total) = slice_page(rows, page);
    Ok(response::paginated(rows, page.page, page.limit, total))
}

/// Create a news article (admin). The caller becomes the author.
#[utoipa::path(
    post,
    path = "/v1/news",
    tag = "News",
    security(("bearer" = [])),
    request_body = CreateNewsRequest,
    responses(
        (status = 201, description = "Article created", body = NewsArticle),
        (status = 404, description = "No such category"),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn create_news(
    Auth(user): Auth,
    State(state): State<AppState>,
    ValidJson(req): ValidJson<CreateNewsRequest>,
) -> Result<Response, ApiError> {
    let article = NewsRepository::new(&state.db).create(
        req.title,
        req.content,
        req.category_id,
        user.id,
        req.published,
        req.image_url,
        req.tags,
    )?;
    tracing::info!(article_id = %article.id, author_id = %user.id, "news article created");
    Ok(response::created(article))
}

/// Fetch one article. Drafts are admin-only.
#[utoipa::path(
    get,
    path = "/v1/news/{id}",
    tag = "News",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Article id")),
    responses(
        (status = 200, description = "Article", body = NewsArticle),
        (status = 404, description = "No such article"),
    )
)]
pub async fn get_news(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let article = NewsRepository::new(&state.db).get(id)?;
    if !article.published && !user.is_admin() {
        return Err(ApiError::not_found(format!("News article {id} not found")));
    }
    Ok(response::ok(article))
}

/// Update an article (admin).
#[utoipa::path(
    put,
    path = "/v1/news/{id}",
    tag = "News",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Article id")),
    request_body = UpdateNewsRequest,
    responses(
        (status = 200, description = "Updated article", body = NewsArticle),
        (status = 404, description = "No such article or category"),
    )
)]
pub async fn update_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateNewsRequest>,
) -> Result<Response, ApiError> {
    let article = NewsRepository::new(&state.db).update(
        id,
        req.title,
        req.content,
        req.category_id.map(Some),
        req.image_url.map(Some),
        req.tags,
    )?;
    Ok(response::ok(article))
}

/// Publish an article (admin).
#[utoipa::path(
    post,
    path = "/v1/news/{id}/publish",
    tag = "News",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Article id")),
    responses(
        (status = 200, description = "Published article", body = NewsArticle),
        (status = 404, description = "No such article"),
    )
)]
pub async fn publish_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(response::ok(
        NewsRepository::new(&state.db).set_published(id, true)?,
    ))
}

/// Unpublish an article (admin).
#[utoipa::path(
    post,
    path = "/v1/news/{id}/unpublish",
    tag = "News",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Article id")),
    responses(
        (status = 200, description = "Unpublished article", body = NewsArticle),
        (status = 404, description = "No such article"),
    )
)]
pub async fn unpublish_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    Ok(response::ok(
        NewsRepository::new(&state.db).set_published(id, false)?,
    ))
}

/// Delete an article (admin).
#[utoipa::path(
    delete,
    path = "/v1/news/{id}",
    tag = "News",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Article id")),
    responses(
        (status = 204, description = "Article deleted"),
        (status = 404, description = "No such article"),
    )
)]
pub async fn delete_news(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    NewsRepository::new(&state.db).delete(id)?;
    Ok(response::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_content_minimums_reported_in_order() {
        let req = CreateNewsRequest {
            title: "Hi".into(),
            content: "Too short".into(),
            category_id: None,
            published: false,
            image_url: Some("not a url".into()),
            tags: vec![],
        };
        let fields: Vec<String> = req
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["title", "content", "image_url"]);
    }

    #[test]
    fn blank_tags_are_rejected_by_index() {
        let req = CreateNewsRequest {
            title: "Basket rebalanced".into(),
            content: "The quarterly basket weights were adjusted.".into(),
            category_id: None,
            published: false,
            image_url: None,
            tags: vec!["gold".into(), "  ".into()],
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "tags[1]");
    }

    #[test]
    fn published_defaults_to_false() {
        let req: CreateNewsRequest = serde_json::from_str(
            r#"{"title":"Basket rebalanced","content":"The quarterly basket weights were adjusted."}"#,
        )
        .unwrap();
        assert!(!req.published);
        assert!(req.tags.is_empty());
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! News categories. Slugs are unique and indexed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::db::{
    PlatformDb, StorageError, StorageResult, NEWS_CATEGORIES, NEWS_CATEGORY_SLUG_IDX,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// URL-friendly identifier, unique.
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewsCategoryRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> NewsCategoryRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    pub fn create(
        &self,
        name: String,
        description: Option<String>,
        slug: String,
    ) -> StorageResult<NewsCategory> {
        if self.db.get_index(NEWS_CATEGORY_SLUG_IDX, &slug)?.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "Category with slug {slug}"
            )));
        }
        let now = Utc::now();
        let category = NewsCategory {
            id: Uuid::new_v4(),
            name,
            description,
            slug,
            created_at: now,
            updated_at: now,
        };
        self.db
            .put(NEWS_CATEGORIES, &category.id.to_string(), &category)?;
        self.db.put_index(
            NEWS_CATEGORY_SLUG_IDX,
            &category.slug,
            &category.id.to_string(),
        )?;
        Ok(category)
    }

    pub fn get(&self, id: Uuid) -> StorageResult<NewsCategory> {
        self.db
            .get(NEWS_CATEGORIES, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("News category {id}")))
    }

    pub fn find_by_slug(&self, slug: &str) -> StorageResult<Option<NewsCategory>> {
        match self.db.get_index(NEWS_CATEGORY_SLUG_IDX, slug)? {
            Some(id) => self.db.get(NEWS_CATEGORIES, &id),
            None => Ok(None),
        }
    }

    /// All categories, name order.
    pub fn list(&self) -> StorageResult<Vec<NewsCategory>> {
        let mut rows: Vec<NewsCategory> = self.db.scan(NEWS_CATEGORIES)?;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    /// Apply field updates. Slug changes re-check uniqueness and move the
    /// index entry.
    pub fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<Option<String>>,
        slug: Option<String>,
    ) -> StorageResult<NewsCategory> {
        let mut category = self.get(id)?;
        if let Some(new_slug) = slug {
            if new_slug != category.slug {
                if self
                    .db
                    .get_index(NEWS_CATEGORY_SLUG_IDX, &new_slug)?
                    .is_some()
                {
                    return Err(StorageError::AlreadyExists(format!(
                        "Category with slug {new_slug}"
                    )));
                }
                self.db
                    .remove_index(NEWS_CATEGORY_SLUG_IDX, &category.slug)?;
                self.db
                    .put_index(NEWS_CATEGORY_SLUG_IDX, &new_slug, &id.to_string())?;
                category.slug = new_slug;
            }
        }
        if let Some(v) = name {
            category.name = v;
        }
        if let Some(v) = description {
            category.description = v;
        }
        category.updated_at = Utc::now();
        self.db.put(NEWS_CATEGORIES, &id.to_string(), &category)?;
        Ok(category)
    }

    pub fn delete(&self, id: Uuid) -> StorageResult<()> {
        let category = self.get(id)?;
        self.db
            .remove_index(NEWS_CATEGORY_SLUG_IDX, &category.slug)?;
        self.db.remove(NEWS_CATEGORIES, &id.to_string())?;
        Ok(())
    }
}

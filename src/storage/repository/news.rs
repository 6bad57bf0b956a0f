// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Platform news articles. Drafts are only visible to admins until
//! published.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::db::{PlatformDb, StorageError, StorageResult, NEWS, NEWS_CATEGORIES};
use crate::storage::repository::news_categories::NewsCategory;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsArticle {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub author_id: Uuid,
    pub published: bool,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewsRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> NewsRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    /// Create an article. A supplied category must exist.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        &self,
        title: String,
        content: String,
        category_id: Option<Uuid>,
        author_id: Uuid,
        published: bool,
        image_url: Option<String>,
        tags: Vec<String>,
    ) -> StorageResult<NewsArticle> {
        if let Some(category_id) = category_id {
            let category: Option<NewsCategory> =
                self.db.get(NEWS_CATEGORIES, &category_id.to_string())?;
            if category.is_none() {
                return Err(StorageError::NotFound(format!(
                    "News category {category_id}"
                )));
            }
        }
        let now = Utc::now();
        let article = NewsArticle {
            id: Uuid::new_v4(),
            title,
            content,
            category_id,
            author_id,
            published,
            image_url,
            tags,
            created_at: now,
            updated_at: now,
        };
        self.db.put(NEWS, &article.id.to_string(), &article)?;
        Ok(article)
    }

    pub fn get(&self, id: Uuid) -> StorageResult<NewsArticle> {
        self.db
            .get(NEWS, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("News article {id}")))
    }

    /// All articles, newest first. `published_only` hides drafts;
    /// `category_id` narrows to one category.
    pub fn list(
        &self,
        published_only: bool,
        category_id: Option<Uuid>,
    ) -> StorageResult<Vec<NewsArticle>> {
        let mut rows: Vec<NewsArticle> = self.db.scan(NEWS)?;
        if published_only {
            rows.retain(|a| a.published);
        }
        if let Some(category_id) = category_id {
            rows.retain(|a| a.category_id == Some(category_id));
        }
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub fn update(
        &self,
        id: Uuid,
        title: Option<String>,
        content: Option<String>,
        category_id: Option<Option<Uuid>>,
        image_url: Option<Option<String>>,
        tags: Option<Vec<String>>,
    ) -> StorageResult<NewsArticle> {
        let mut article = self.get(id)?;
        if let Some(new_category) = category_id {
            if let Some(category_id) = new_category {
                let category: Option<NewsCategory> =
                    self.db.get(NEWS_CATEGORIES, &category_id.to_string())?;
                if category.is_none() {
                    return Err(StorageError::NotFound(format!(
                        "News category {category_id}"
                    )));
                }
            }
            article.category_id = new_category;
        }
        if let Some(v) = title {
            article.title = v;
        }
        if let Some(v) = content {
            article.content = v;
        }
        if let Some(v) = image_url {
            article.image_url = v;
        }
        if let Some(v) = tags {
            article.tags = v;
        }
        article.updated_at = Utc::now();
        self.db.put(NEWS, &id.to_string(), &article)?;
        Ok(article)
    }

    pub fn set_published(&self, id: Uuid, published: bool) -> StorageResult<NewsArticle> {
        let mut article = self.get(id)?;
        article.published = published;
        article.updated_at = Utc::now();
        self.db.put(NEWS, &id.to_string(), &article)?;
        Ok(article)
    }

    pub fn delete(&self, id: Uuid) -> StorageResult<()> {
        if !self.db.remove(NEWS, &id.to_string())? {
            return Err(StorageError::NotFound(format!("News article {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::news_categories::NewsCategoryRepository;
    use tempfile::TempDir;

    fn open_db() -> (PlatformDb, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = PlatformDb::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    fn article(repo: &NewsRepository, title: &str, published: bool) -> NewsArticle {
        repo.create(
            title.into(),
            "Long enough body for the reference data.".into(),
            None,
            Uuid::new_v4(),
            published,
            None,
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn published_filter_hides_drafts() {
        let (db, _dir) = open_db();
        let repo = NewsRepository::new(&db);
        article(&repo, "Draft", false);
        article(&repo, "Live", true);

        let published = repo.list(true, None).unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Live");
        assert_eq!(repo.list(false, None).unwrap().len(), 2);
    }

    #[test]
    fn create_rejects_unknown_category() {
        let (db, _dir) = open_db();
        let repo = NewsRepository::new(&db);
        let err = repo
            .create(
                "Title".into(),
                "Body".into(),
                Some(Uuid::new_v4()),
                Uuid::new_v4(),
                false,
                None,
                vec![],
            )
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[test]
    fn category_filter_matches() {
        let (db, _dir) = open_db();
        let categories = NewsCategoryRepository::new(&db);
        let markets = categories
            .create("Markets".into(), None, "markets".into())
            .unwrap();
        let repo = NewsRepository::new(&db);
        article(&repo, "Uncategorized", true);
        repo.create(
            "Categorized".into(),
            "Long enough body for the reference data.".into(),
            Some(markets.id),
            Uuid::new_v4(),
            true,
            None,
            vec!["gold".into()],
        )
        .unwrap();

        let rows = repo.list(true, Some(markets.id)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Categorized");
    }

    #[test]
    fn publish_and_unpublish_toggle() {
        let (db, _dir) = open_db();
        let repo = NewsRepository::new(&db);
        let a = article(&repo, "Draft", false);

        assert!(repo.set_published(a.id, true).unwrap().published);
        assert!(!repo.set_published(a.id, false).unwrap().published);
    }
}

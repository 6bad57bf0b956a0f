// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC document submissions and their review lifecycle.
//!
//! Review outcomes feed back into the owning profile: approving the last
//! outstanding document flips the profile to `approved`, any rejection
//! flips it to `rejected`. That propagation lives in the API layer so the
//! repository stays a plain document store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::db::{PlatformDb, StorageError, StorageResult, KYC_DOCUMENTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Passport,
    NationalId,
    DriversLicense,
    ProofOfAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct KycDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_type: DocumentType,
    pub document_url: String,
    pub status: ReviewStatus,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct KycRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> KycRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    pub fn submit(
        &self,
        user_id: Uuid,
        document_type: DocumentType,
        document_url: String,
    ) -> StorageResult<KycDocument> {
        let now = Utc::now();
        let doc = KycDocument {
            id: Uuid::new_v4(),
            user_id,
            document_type,
            document_url,
            status: ReviewStatus::Pending,
            rejection_reason: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.db.put(KYC_DOCUMENTS, &doc.id.to_string(), &doc)?;
        Ok(doc)
    }

    pub fn get(&self, id: Uuid) -> StorageResult<KycDocument> {
        self.db
            .get(KYC_DOCUMENTS, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("KYC document {id}")))
    }

    pub fn list(&self) -> StorageResult<Vec<KycDocument>> {
        let mut rows: Vec<KycDocument> = self.db.scan(KYC_DOCUMENTS)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub fn list_for_user(&self, user_id: Uuid) -> StorageResult<Vec<KycDocument>> {
        let mut rows = self.list()?;
        rows.retain(|d| d.user_id == user_id);
        Ok(rows)
    }

    /// Review queue: documents still awaiting a decision, oldest first.
    pub fn list_pending(&self) -> StorageResult<Vec<KycDocument>> {
        let mut rows = self.list()?;
        rows.retain(|d| d.status == ReviewStatus::Pending);
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    pub fn count_pending(&self) -> StorageResult<u64> {
        Ok(self.list_pending()?.len() as u64)
    }

    /// Record a review decision. Rejections carry a reason.
    pub fn review(
        &self,
        id: Uuid,
        status: ReviewStatus,
        rejection_reason: Option<String>,
        reviewer: Uuid,
    ) -> StorageResult<KycDocument> {
        let mut doc = self.get(id)?;
        if doc.status != ReviewStatus::Pending {
            return Err(StorageError::Invalid(
                "Document has already been reviewed".into(),
            ));
        }
        let now = Utc::now();
        doc.status = status;
        doc.rejection_reason = rejection_reason;
        doc.reviewed_by = Some(reviewer);
        doc.reviewed_at = Some(now);
        doc.updated_at = now;
        self.db.put(KYC_DOCUMENTS, &id.to_string(), &doc)?;
        Ok(doc)
    }

    /// True when the user has at least one document and none still pending
    /// or rejected.
    pub fn all_approved(&self, user_id: Uuid) -> StorageResult<bool> {
        let docs = self.list_for_user(user_id)?;
        Ok(!docs.is_empty() && docs.iter().all(|d| d.status == ReviewStatus::Approved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_db() -> (PlatformDb, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = PlatformDb::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    #[test]
    fn submit_starts_pending() {
        let (db, _dir) = open_db();
        let repo = KycRepository::new(&db);
        let doc = repo
            .submit(
                Uuid::new_v4(),
                DocumentType::Passport,
                "https://files.example.com/p.pdf".into(),
            )
            .unwrap();
        assert_eq!(doc.status, ReviewStatus::Pending);
        assert!(doc.reviewed_by.is_none());
    }

    #[test]
    fn review_is_single_shot() {
        let (db, _dir) = open_db();
        let repo = KycRepository::new(&db);
        let reviewer = Uuid::new_v4();
        let doc = repo
            .submit(Uuid::new_v4(), DocumentType::NationalId, "https://f/x".into())
            .unwrap();

        let approved = repo
            .review(doc.id, ReviewStatus::Approved, None, reviewer)
            .unwrap();
        assert_eq!(approved.reviewed_by, Some(reviewer));

        let err = repo
            .review(doc.id, ReviewStatus::Rejected, Some("blurry".into()), reviewer)
            .unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));
    }

    #[test]
    fn all_approved_requires_every_document() {
        let (db, _dir) = open_db();
        let repo = KycRepository::new(&db);
        let user = Uuid::new_v4();
        let reviewer = Uuid::new_v4();

        assert!(!repo.all_approved(user).unwrap());

        let d1 = repo
            .submit(user, DocumentType::Passport, "https://f/1".into())
            .unwrap();
        let d2 = repo
            .submit(user, DocumentType::ProofOfAddress, "https://f/2".into())
            .unwrap();

        repo.review(d1.id, ReviewStatus::Approved, None, reviewer).unwrap();
        assert!(!repo.all_approved(user).unwrap());

        repo.review(d2.id, ReviewStatus::Approved, None, reviewer).unwrap();
        assert!(repo.all_approved(user).unwrap());
    }

    #[test]
    fn pending_queue_is_oldest_first() {
        let (db, _dir) = open_db();
        let repo = KycRepository::new(&db);
        let first = repo
            .submit(Uuid::new_v4(), DocumentType::Passport, "https://f/1".into())
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = repo
            .submit(Uuid::new_v4(), DocumentType::Passport, "https://f/2".into())
            .unwrap();

        let queue = repo.list_pending().unwrap();
        assert_eq!(queue[0].id, first.id);
        assert_eq!(queue[1].id, second.id);
    }
}

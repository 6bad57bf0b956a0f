// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User profiles: identity rows for every platform account.
//!
//! Emails are stored NFC-normalized and lowercased; the email index table
//! enforces uniqueness. Password digests stay internal to this module —
//! [`ProfileResponse`] is the only shape handed to the API layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Role;
use crate::storage::db::{PlatformDb, StorageError, StorageResult, PROFILES, PROFILE_EMAIL_IDX};

/// KYC standing of a profile, driven by document review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    Pending,
    Approved,
    Rejected,
}

/// Stored profile row. Never serialized onto the wire directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub kyc_status: KycStatus,
    /// Salted HMAC digest, `base64(salt).base64(tag)` format.
    pub password_digest: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape for a profile. Excludes the password digest.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub kyc_status: KycStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            full_name: p.full_name,
            phone: p.phone,
            role: p.role,
            is_active: p.is_active,
            kyc_status: p.kyc_status,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

pub struct ProfileRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    /// Create a profile. The email must already be normalized
    /// ([`crate::crypto::normalize_email`]).
    pub fn create(
        &self,
        email: String,
        full_name: Option<String>,
        phone: Option<String>,
        role: Role,
        password_digest: Option<String>,
    ) -> StorageResult<Profile> {
        if self.db.get_index(PROFILE_EMAIL_IDX, &email)?.is_some() {
            return Err(StorageError::AlreadyExists(format!(
                "User with email {email}"
            )));
        }
        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4(),
            email,
            full_name,
            phone,
            role,
            is_active: true,
            kyc_status: KycStatus::Pending,
            password_digest,
            created_at: now,
            updated_at: now,
        };
        self.db
            .put(PROFILES, &profile.id.to_string(), &profile)?;
        self.db
            .put_index(PROFILE_EMAIL_IDX, &profile.email, &profile.id.to_string())?;
        Ok(profile)
    }

    pub fn get(&self, id: Uuid) -> StorageResult<Profile> {
        self.db
            .get(PROFILES, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("User {id}")))
    }

    pub fn find(&self, id: Uuid) -> StorageResult<Option<Profile>> {
        self.db.get(PROFILES, &id.to_string())
    }

    pub fn find_by_email(&self, email: &str) -> StorageResult<Option<Profile>> {
        match self.db.get_index(PROFILE_EMAIL_IDX, email)? {
            Some(id) => self.db.get(PROFILES, &id),
            None => Ok(None),
        }
    }

    /// All profiles, newest first.
    pub fn list(&self) -> StorageResult<Vec<Profile>> {
        let mut rows: Vec<Profile> = self.db.scan(PROFILES)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub fn count(&self) -> StorageResult<u64> {
        self.db.count(PROFILES)
    }

    /// Apply field updates. Email changes re-check uniqueness and move the
    /// index entry.
    pub fn update(
        &self,
        id: Uuid,
        email: Option<String>,
        full_name: Option<Option<String>>,
        phone: Option<Option<String>>,
        role: Option<Role>,
        is_active: Option<bool>,
    ) -> StorageResult<Profile> {
        let mut profile = self.get(id)?;
        if let Some(new_email) = email {
            if new_email != profile.email {
                if self.db.get_index(PROFILE_EMAIL_IDX, &new_email)?.is_some() {
                    return Err(StorageError::AlreadyExists(format!(
                        "User with email {new_email}"
                    )));
                }
                self.db.remove_index(PROFILE_EMAIL_IDX, &profile.email)?;
                self.db
                    .put_index(PROFILE_EMAIL_IDX, &new_email, &id.to_string())?;
                profile.email = new_email;
            }
        }
        if let Some(v) = full_name {
            profile.full_name = v;
        }
        if let Some(v) = phone {
            profile.phone = v;
        }
        if let Some(v) = role {
            profile.role = v;
        }
        if let Some(v) = is_active {
            profile.is_active = v;
        }
        profile.updated_at = Utc::now();
        self.db.put(PROFILES, &id.to_string(), &profile)?;
        Ok(profile)
    }

    pub fn set_kyc_status(&self, id: Uuid, status: KycStatus) -> StorageResult<Profile> {
        let mut profile = self.get(id)?;
        profile.kyc_status = status;
        profile.updated_at = Utc::now();
        self.db.put(PROFILES, &id.to_string(), &profile)?;
        Ok(profile)
    }

    pub fn set_active(&self, id: Uuid, active: bool) -> StorageResult<Profile> {
        let mut profile = self.get(id)?;
        profile.is_active = active;
        profile.updated_at = Utc::now();
        self.db.put(PROFILES, &id.to_string(), &profile)?;
        Ok(profile)
    }

    pub fn delete(&self, id: Uuid) -> StorageResult<()> {
        let profile = self.get(id)?;
        self.db.remove_index(PROFILE_EMAIL_IDX, &profile.email)?;
        self.db.remove(PROFILES, &id.to_string())?;
        Ok(())
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
    fn create_and_fetch_by_email() {
        let (db, _dir) = open_db();
        let repo = ProfileRepository::new(&db);

        let created = repo
            .create(
                "alice@example.com".into(),
                Some("Alice".into()),
                None,
                Role::User,
                None,
            )
            .unwrap();
        assert!(created.is_active);
        assert_eq!(created.kyc_status, KycStatus::Pending);

        let found = repo.find_by_email("alice@example.com").unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let (db, _dir) = open_db();
        let repo = ProfileRepository::new(&db);
        repo.create("a@example.com".into(), None, None, Role::User, None)
            .unwrap();
        let err = repo
            .create("a@example.com".into(), None, None, Role::User, None)
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[test]
    fn update_moves_email_index() {
        let (db, _dir) = open_db();
        let repo = ProfileRepository::new(&db);
        let p = repo
            .create("old@example.com".into(), None, None, Role::User, None)
            .unwrap();

        repo.update(p.id, Some("new@example.com".into()), None, None, None, None)
            .unwrap();

        assert!(repo.find_by_email("old@example.com").unwrap().is_none());
        assert_eq!(
            repo.find_by_email("new@example.com").unwrap().unwrap().id,
            p.id
        );
    }

    #[test]
    fn delete_clears_index() {
        let (db, _dir) = open_db();
        let repo = ProfileRepository::new(&db);
        let p = repo
            .create("gone@example.com".into(), None, None, Role::User, None)
            .unwrap();
        repo.delete(p.id).unwrap();
        assert!(repo.find(p.id).unwrap().is_none());
        assert!(repo.find_by_email("gone@example.com").unwrap().is_none());
        assert!(matches!(
            repo.get(p.id).unwrap_err(),
            StorageError::NotFound(_)
        ));
    }

    #[test]
    fn response_excludes_digest() {
        let (db, _dir) = open_db();
        let repo = ProfileRepository::new(&db);
        let p = repo
            .create(
                "b@example.com".into(),
                None,
                None,
                Role::User,
                Some("salt.tag".into()),
            )
            .unwrap();
        let json = serde_json::to_value(ProfileResponse::from(p)).unwrap();
        assert!(json.get("password_digest").is_none());
    }
}

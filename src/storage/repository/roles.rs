// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Named permission sets, admin-managed. Distinct from the coarse
//! [`crate::auth::Role`] carried on profiles: these records hold the
//! fine-grained permission strings attached to a role name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::db::{PlatformDb, StorageError, StorageResult, ROLES, ROLE_NAME_IDX};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct RoleRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> RoleRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    pub fn create(
        &self,
        name: String,
        description: Option<String>,
        permissions: Vec<String>,
    ) -> StorageResult<RoleRecord> {
        if self.db.get_index(ROLE_NAME_IDX, &name)?.is_some() {
            return Err(StorageError::AlreadyExists(format!("Role {name}")));
        }
        let now = Utc::now();
        let record = RoleRecord {
            id: Uuid::new_v4(),
            name,
            description,
            permissions,
            created_at: now,
            updated_at: now,
        };
        self.db.put(ROLES, &record.id.to_string(), &record)?;
        self.db
            .put_index(ROLE_NAME_IDX, &record.name, &record.id.to_string())?;
        Ok(record)
    }

    pub fn get(&self, id: Uuid) -> StorageResult<RoleRecord> {
        self.db
            .get(ROLES, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("Role {id}")))
    }

    pub fn find_by_name(&self, name: &str) -> StorageResult<Option<RoleRecord>> {
        match self.db.get_index(ROLE_NAME_IDX, name)? {
            Some(id) => self.db.get(ROLES, &id),
            None => Ok(None),
        }
    }

    pub fn list(&self) -> StorageResult<Vec<RoleRecord>> {
        let mut rows: Vec<RoleRecord> = self.db.scan(ROLES)?;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    pub fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        description: Option<Option<String>>,
        permissions: Option<Vec<String>>,
    ) -> StorageResult<RoleRecord> {
        let mut record = self.get(id)?;
        if let Some(new_name) = name {
            if new_name != record.name {
                if self.db.get_index(ROLE_NAME_IDX, &new_name)?.is_some() {
                    return Err(StorageError::AlreadyExists(format!("Role {new_name}")));
                }
                self.db.remove_index(ROLE_NAME_IDX, &record.name)?;
                self.db
                    .put_index(ROLE_NAME_IDX, &new_name, &id.to_string())?;
                record.name = new_name;
            }
        }
        if let Some(v) = description {
            record.description = v;
        }
        if let Some(v) = permissions {
            record.permissions = v;
        }
        record.updated_at = Utc::now();
        self.db.put(ROLES, &id.to_string(), &record)?;
        Ok(record)
    }

    /// Idempotent: adding a permission the role already has is a no-op.
    pub fn add_permission(&self, id: Uuid, permission: String) -> StorageResult<RoleRecord> {
        let mut record = self.get(id)?;
        if !record.permissions.contains(&permission) {
            record.permissions.push(permission);
            record.updated_at = Utc::now();
            self.db.put(ROLES, &id.to_string(), &record)?;
        }
        Ok(record)
    }

    pub fn remove_permission(&self, id: Uuid, permission: &str) -> StorageResult<RoleRecord> {
        let mut record = self.get(id)?;
        let before = record.permissions.len();
        record.permissions.retain(|p| p != permission);
        if record.permissions.len() != before {
            record.updated_at = Utc::now();
            self.db.put(ROLES, &id.to_string(), &record)?;
        }
        Ok(record)
    }

    pub fn delete(&self, id: Uuid) -> StorageResult<()> {
        let record = self.get(id)?;
        self.db.remove_index(ROLE_NAME_IDX, &record.name)?;
        self.db.remove(ROLES, &id.to_string())?;
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
    fn name_is_unique() {
        let (db, _dir) = open_db();
        let repo = RoleRepository::new(&db);
        repo.create("auditor".into(), None, vec![]).unwrap();
        let err = repo.create("auditor".into(), None, vec![]).unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));
    }

    #[test]
    fn permission_edits_are_idempotent() {
        let (db, _dir) = open_db();
        let repo = RoleRepository::new(&db);
        let role = repo
            .create("support".into(), None, vec!["users:read".into()])
            .unwrap();

        let r = repo.add_permission(role.id, "users:read".into()).unwrap();
        assert_eq!(r.permissions.len(), 1);

        let r = repo.add_permission(role.id, "kyc:review".into()).unwrap();
        assert_eq!(r.permissions, vec!["users:read", "kyc:review"]);

        let r = repo.remove_permission(role.id, "users:read").unwrap();
        assert_eq!(r.permissions, vec!["kyc:review"]);

        let r = repo.remove_permission(role.id, "users:read").unwrap();
        assert_eq!(r.permissions, vec!["kyc:review"]);
    }

    #[test]
    fn rename_moves_index() {
        let (db, _dir) = open_db();
        let repo = RoleRepository::new(&db);
        let role = repo.create("ops".into(), None, vec![]).unwrap();
        repo.update(role.id, Some("operations".into()), None, None)
            .unwrap();
        assert!(repo.find_by_name("ops").unwrap().is_none());
        assert!(repo.find_by_name("operations").unwrap().is_some());
    }
}

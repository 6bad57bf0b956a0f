// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Custodial wallets.
//!
//! A wallet either carries a caller-supplied public key (non-custodial,
//! no stored secret) or a generated keypair whose secret is AEAD-encrypted
//! at rest. [`WalletResponse`] is the only shape the API layer returns;
//! it never includes the encrypted secret.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::db::{PlatformDb, StorageError, StorageResult, WALLETS};

/// Stored wallet row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub public_key: String,
    /// Base64 AEAD ciphertext of the secret key; `None` for
    /// caller-supplied keys.
    pub secret_key_encrypted: Option<String>,
    pub balance: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape for a wallet. Excludes the encrypted secret.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub public_key: String,
    pub balance: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Wallet> for WalletResponse {
    fn from(w: Wallet) -> Self {
        Self {
            id: w.id,
            user_id: w.user_id,
            public_key: w.public_key,
            balance: w.balance,
            is_active: w.is_active,
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

pub struct WalletRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> WalletRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    pub fn create(
        &self,
        user_id: Uuid,
        public_key: String,
        secret_key_encrypted: Option<String>,
    ) -> StorageResult<Wallet> {
        let now = Utc::now();
        let wallet = Wallet {
            id: Uuid::new_v4(),
            user_id,
            public_key,
            secret_key_encrypted,
            balance: 0.0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.db.put(WALLETS, &wallet.id.to_string(), &wallet)?;
        Ok(wallet)
    }

    pub fn get(&self, id: Uuid) -> StorageResult<Wallet> {
        self.db
            .get(WALLETS, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("Wallet {id}")))
    }

    pub fn list(&self) -> StorageResult<Vec<Wallet>> {
        let mut rows: Vec<Wallet> = self.db.scan(WALLETS)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub fn list_for_user(&self, user_id: Uuid) -> StorageResult<Vec<Wallet>> {
        let mut rows = self.list()?;
        rows.retain(|w| w.user_id == user_id);
        Ok(rows)
    }

    pub fn count(&self) -> StorageResult<u64> {
        self.db.count(WALLETS)
    }

    pub fn set_active(&self, id: Uuid, active: bool) -> StorageResult<Wallet> {
        let mut wallet = self.get(id)?;
        wallet.is_active = active;
        wallet.updated_at = Utc::now();
        self.db.put(WALLETS, &id.to_string(), &wallet)?;
        Ok(wallet)
    }

    /// Deactivate every wallet belonging to a user (account suspension).
    pub fn deactivate_for_user(&self, user_id: Uuid) -> StorageResult<u64> {
        let mut changed = 0;
        for wallet in self.list_for_user(user_id)? {
            if wallet.is_active {
                self.set_active(wallet.id, false)?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Admin balance adjustment (deposits / corrections). Transfer
    /// processing does NOT go through here; see
    /// [`super::transactions::TransactionRepository::process`].
    pub fn set_balance(&self, id: Uuid, balance: f64) -> StorageResult<Wallet> {
        let mut wallet = self.get(id)?;
        wallet.balance = balance;
        wallet.updated_at = Utc::now();
        self.db.put(WALLETS, &id.to_string(), &wallet)?;
        Ok(wallet)
    }

    pub fn delete(&self, id: Uuid) -> StorageResult<()> {
        if !self.db.remove(WALLETS, &id.to_string())? {
            return Err(StorageError::NotFound(format!("Wallet {id}")));
        }
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
    fn create_starts_with_zero_balance() {
        let (db, _dir) = open_db();
        let repo = WalletRepository::new(&db);
        let w = repo
            .create(Uuid::new_v4(), "ACTabc".into(), Some("cipher".into()))
            .unwrap();
        assert_eq!(w.balance, 0.0);
        assert!(w.is_active);
    }

    #[test]
    fn list_for_user_filters() {
        let (db, _dir) = open_db();
        let repo = WalletRepository::new(&db);
        let owner = Uuid::new_v4();
        repo.create(owner, "ACT1".into(), None).unwrap();
        repo.create(owner, "ACT2".into(), None).unwrap();
        repo.create(Uuid::new_v4(), "ACT3".into(), None).unwrap();

        assert_eq!(repo.list_for_user(owner).unwrap().len(), 2);
        assert_eq!(repo.list().unwrap().len(), 3);
    }

    #[test]
    fn deactivate_for_user_skips_inactive() {
        let (db, _dir) = open_db();
        let repo = WalletRepository::new(&db);
        let owner = Uuid::new_v4();
        let w1 = repo.create(owner, "ACT1".into(), None).unwrap();
        repo.create(owner, "ACT2".into(), None).unwrap();
        repo.set_active(w1.id, false).unwrap();

        assert_eq!(repo.deactivate_for_user(owner).unwrap(), 1);
        assert!(repo.list_for_user(owner).unwrap().iter().all(|w| !w.is_active));
    }

    #[test]
    fn response_excludes_secret() {
        let (db, _dir) = open_db();
        let repo = WalletRepository::new(&db);
        let w = repo
            .create(Uuid::new_v4(), "ACTabc".into(), Some("cipher".into()))
            .unwrap();
        let json = serde_json::to_value(WalletResponse::from(w)).unwrap();
        assert!(json.get("secret_key_encrypted").is_none());
    }

    #[test]
    fn missing_wallet_is_not_found() {
        let (db, _dir) = open_db();
        let repo = WalletRepository::new(&db);
        assert!(matches!(
            repo.get(Uuid::new_v4()).unwrap_err(),
            StorageError::NotFound(_)
        ));
        assert!(matches!(
            repo.delete(Uuid::new_v4()).unwrap_err(),
            StorageError::NotFound(_)
        ));
    }
}

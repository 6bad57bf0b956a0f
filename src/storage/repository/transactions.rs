// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ledger transactions between wallets.
//!
//! [`TransactionRepository::process`] applies the debit, the credit and the
//! status transition inside ONE redb write transaction. A processing run
//! either commits fully or leaves both balances untouched; domain failures
//! (missing wallet, bad status, insufficient funds) mark the row `failed`
//! in a separate follow-up write.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::wallets::Wallet;
use crate::storage::db::{PlatformDb, StorageError, StorageResult, TRANSACTIONS, WALLETS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Transfer,
    Deposit,
    Withdrawal,
    Exchange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub transaction_hash: String,
    pub from_wallet_id: Option<Uuid>,
    pub to_wallet_id: Option<Uuid>,
    pub amount: f64,
    pub fee: f64,
    pub transaction_type: TxKind,
    pub status: TxStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct TransactionRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    /// Record a new pending transaction. Referenced wallets must exist and
    /// a transfer's source must cover `amount + fee`.
    pub fn create(
        &self,
        from_wallet_id: Option<Uuid>,
        to_wallet_id: Option<Uuid>,
        amount: f64,
        fee: f64,
        transaction_type: TxKind,
        description: Option<String>,
    ) -> StorageResult<TransactionRecord> {
        if let Some(from) = from_wallet_id {
            let wallet: Wallet = self
                .db
                .get(WALLETS, &from.to_string())?
                .ok_or_else(|| StorageError::NotFound(format!("Wallet {from}")))?;
            if wallet.balance < amount + fee {
                return Err(StorageError::Invalid("Insufficient balance".into()));
            }
        }
        if let Some(to) = to_wallet_id {
            let _: Wallet = self
                .db
                .get(WALLETS, &to.to_string())?
                .ok_or_else(|| StorageError::NotFound(format!("Wallet {to}")))?;
        }

        let now = Utc::now();
        let id = Uuid::new_v4();
        let record = TransactionRecord {
            id,
            transaction_hash: format!("0x{}", id.simple()),
            from_wallet_id,
            to_wallet_id,
            amount,
            fee,
            transaction_type,
            status: TxStatus::Pending,
            description,
            created_at: now,
            updated_at: now,
        };
        self.db.put(TRANSACTIONS, &id.to_string(), &record)?;
        Ok(record)
    }

    pub fn get(&self, id: Uuid) -> StorageResult<TransactionRecord> {
        self.db
            .get(TRANSACTIONS, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("Transaction {id}")))
    }

    pub fn list(&self) -> StorageResult<Vec<TransactionRecord>> {
        let mut rows: Vec<TransactionRecord> = self.db.scan(TRANSACTIONS)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    /// Transactions touching any of the given wallets.
    pub fn list_for_wallets(&self, wallet_ids: &[Uuid]) -> StorageResult<Vec<TransactionRecord>> {
        let mut rows = self.list()?;
        rows.retain(|t| {
            t.from_wallet_id.map(|w| wallet_ids.contains(&w)).unwrap_or(false)
                || t.to_wallet_id.map(|w| wallet_ids.contains(&w)).unwrap_or(false)
        });
        Ok(rows)
    }

    pub fn count(&self) -> StorageResult<u64> {
        self.db.count(TRANSACTIONS)
    }

    pub fn update(
        &self,
        id: Uuid,
        status: Option<TxStatus>,
        description: Option<Option<String>>,
    ) -> StorageResult<TransactionRecord> {
        let mut record = self.get(id)?;
        if let Some(v) = status {
            record.status = v;
        }
        if let Some(v) = description {
            record.description = v;
        }
        record.updated_at = Utc::now();
        self.db.put(TRANSACTIONS, &id.to_string(), &record)?;
        Ok(record)
    }

    pub fn delete(&self, id: Uuid) -> StorageResult<()> {
        if !self.db.remove(TRANSACTIONS, &id.to_string())? {
            return Err(StorageError::NotFound(format!("Transaction {id}")));
        }
        Ok(())
    }

    /// Process a pending transfer: debit the source, credit the
    /// destination and flip the status to `completed`, all in one write
    /// transaction. On any domain failure the write aborts (balances
    /// untouched) and the row is marked `failed` before the error is
    /// returned.
    pub fn process(&self, id: Uuid) -> StorageResult<TransactionRecord> {
        match self.apply_transfer(id) {
            Ok(record) => Ok(record),
            Err(err) => {
                // Only domain errors demote the row; storage failures may
                // mean the row itself is unreachable.
                if matches!(
                    err,
                    StorageError::Invalid(_) | StorageError::NotFound(_)
                ) {
                    if let Ok(record) = self.get(id) {
                        // A row already terminal stays terminal.
                        if record.status == TxStatus::Pending {
                            let mut failed = record;
                            failed.status = TxStatus::Failed;
                            failed.updated_at = Utc::now();
                            self.db.put(TRANSACTIONS, &id.to_string(), &failed)?;
                        }
                    }
                }
                Err(err)
            }
        }
    }

    fn apply_transfer(&self, id: Uuid) -> StorageResult<TransactionRecord> {
        let write_txn = self.db.raw().begin_write()?;
        let record = {
            let mut tx_table = write_txn.open_table(TRANSACTIONS)?;
            let mut wallet_table = write_txn.open_table(WALLETS)?;

            let mut record: TransactionRecord = match tx_table.get(id.to_string().as_str())? {
                Some(v) => serde_json::from_slice(v.value())?,
                None => return Err(StorageError::NotFound(format!("Transaction {id}"))),
            };
            if record.status != TxStatus::Pending {
                return Err(StorageError::Invalid("Transaction is not pending".into()));
            }

            let from_id = record
                .from_wallet_id
                .ok_or_else(|| StorageError::Invalid("Transaction has no source wallet".into()))?;
            let to_id = record
                .to_wallet_id
                .ok_or_else(|| StorageError::Invalid("Transaction has no destination wallet".into()))?;

            let mut from: Wallet = match wallet_table.get(from_id.to_string().as_str())? {
                Some(v) => serde_json::from_slice(v.value())?,
                None => return Err(StorageError::NotFound(format!("Wallet {from_id}"))),
            };
            let mut to: Wallet = match wallet_table.get(to_id.to_string().as_str())? {
                Some(v) => serde_json::from_slice(v.value())?,
                None => return Err(StorageError::NotFound(format!("Wallet {to_id}"))),
            };

            let debit = record.amount + record.fee;
            if from.balance < debit {
                return Err(StorageError::Invalid("Insufficient balance".into()));
            }

            let now = Utc::now();
            from.balance -= debit;
            from.updated_at = now;
            to.balance += record.amount;
            to.updated_at = now;
            record.status = TxStatus::Completed;
            record.updated_at = now;

            wallet_table.insert(
                from_id.to_string().as_str(),
                serde_json::to_vec(&from)?.as_slice(),
            )?;
            wallet_table.insert(
                to_id.to_string().as_str(),
                serde_json::to_vec(&to)?.as_slice(),
            )?;
            tx_table.insert(
                id.to_string().as_str(),
                serde_json::to_vec(&record)?.as_slice(),
            )?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repository::wallets::WalletRepository;
    use tempfile::TempDir;

    fn open_db() -> (PlatformDb, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = PlatformDb::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    fn funded_pair(db: &PlatformDb, from_balance: f64) -> (Wallet, Wallet) {
        let wallets = WalletRepository::new(db);
        let from = wallets.create(Uuid::new_v4(), "ACT-from".into(), None).unwrap();
        let to = wallets.create(Uuid::new_v4(), "ACT-to".into(), None).unwrap();
        let from = wallets.set_balance(from.id, from_balance).unwrap();
        (from, to)
    }

    #[test]
    fn create_rejects_insufficient_source() {
        let (db, _dir) = open_db();
        let (from, to) = funded_pair(&db, 5.0);
        let repo = TransactionRepository::new(&db);
        let err = repo
            .create(Some(from.id), Some(to.id), 10.0, 0.0, TxKind::Transfer, None)
            .unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));
    }

    #[test]
    fn process_conserves_total_balance() {
        let (db, _dir) = open_db();
        let (from, to) = funded_pair(&db, 100.0);
        let repo = TransactionRepository::new(&db);
        let tx = repo
            .create(Some(from.id), Some(to.id), 30.0, 2.0, TxKind::Transfer, None)
            .unwrap();

        let done = repo.process(tx.id).unwrap();
        assert_eq!(done.status, TxStatus::Completed);

        let wallets = WalletRepository::new(&db);
        let from_after = wallets.get(from.id).unwrap();
        let to_after = wallets.get(to.id).unwrap();
        assert_eq!(from_after.balance, 68.0);
        assert_eq!(to_after.balance, 30.0);
        // amount conserved, fee burned
        assert_eq!(from_after.balance + to_after.balance, 100.0 - 2.0);
    }

    #[test]
    fn process_failure_leaves_balances_untouched() {
        let (db, _dir) = open_db();
        let (from, to) = funded_pair(&db, 100.0);
        let repo = TransactionRepository::new(&db);
        let tx = repo
            .create(Some(from.id), Some(to.id), 90.0, 0.0, TxKind::Transfer, None)
            .unwrap();

        // Drain the source after the transaction was created
        let wallets = WalletRepository::new(&db);
        wallets.set_balance(from.id, 10.0).unwrap();

        let err = repo.process(tx.id).unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));

        assert_eq!(wallets.get(from.id).unwrap().balance, 10.0);
        assert_eq!(wallets.get(to.id).unwrap().balance, 0.0);
        assert_eq!(repo.get(tx.id).unwrap().status, TxStatus::Failed);
    }

    #[test]
    fn process_rejects_non_pending() {
        let (db, _dir) = open_db();
        let (from, to) = funded_pair(&db, 100.0);
        let repo = TransactionRepository::new(&db);
        let tx = repo
            .create(Some(from.id), Some(to.id), 10.0, 0.0, TxKind::Transfer, None)
            .unwrap();
        repo.process(tx.id).unwrap();

        let err = repo.process(tx.id).unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));
        // The completed row stays completed and balances stay put
        assert_eq!(repo.get(tx.id).unwrap().status, TxStatus::Completed);
        let wallets = WalletRepository::new(&db);
        assert_eq!(wallets.get(from.id).unwrap().balance, 90.0);
    }

    #[test]
    fn list_for_wallets_matches_either_side() {
        let (db, _dir) = open_db();
        let (from, to) = funded_pair(&db, 100.0);
        let repo = TransactionRepository::new(&db);
        repo.create(Some(from.id), Some(to.id), 1.0, 0.0, TxKind::Transfer, None)
            .unwrap();
        repo.create(None, Some(to.id), 5.0, 0.0, TxKind::Deposit, None)
            .unwrap();

        assert_eq!(repo.list_for_wallets(&[from.id]).unwrap().len(), 1);
        assert_eq!(repo.list_for_wallets(&[to.id]).unwrap().len(), 2);
        assert_eq!(repo.list_for_wallets(&[Uuid::new_v4()]).unwrap().len(), 0);
    }
}

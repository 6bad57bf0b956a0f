// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded platform database backed by redb (pure Rust, ACID).
//!
//! Rows are stored as JSON bytes keyed by UUID string; unique secondary
//! keys (emails, codes, pairs) live in string→string index tables.
//! Repositories in [`super::repository`] wrap this with typed operations.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;

// =============================================================================
// Table Definitions
// =============================================================================

/// Row table type: UUID string → JSON bytes.
pub(crate) type RowTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// Index table type: unique key → UUID string.
pub(crate) type IndexTable = TableDefinition<'static, &'static str, &'static str>;

pub(crate) const PROFILES: RowTable = TableDefinition::new("profiles");
pub(crate) const PROFILE_EMAIL_IDX: IndexTable = TableDefinition::new("profile_email_idx");
pub(crate) const WALLETS: RowTable = TableDefinition::new("wallets");
pub(crate) const TRANSACTIONS: RowTable = TableDefinition::new("transactions");
pub(crate) const KYC_DOCUMENTS: RowTable = TableDefinition::new("kyc_documents");
pub(crate) const ROLES: RowTable = TableDefinition::new("roles");
pub(crate) const ROLE_NAME_IDX: IndexTable = TableDefinition::new("role_name_idx");
pub(crate) const CURRENCIES: RowTable = TableDefinition::new("currencies");
pub(crate) const CURRENCY_CODE_IDX: IndexTable = TableDefinition::new("currency_code_idx");
pub(crate) const COUNTRIES: RowTable = TableDefinition::new("countries");
pub(crate) const COUNTRY_CODE_IDX: IndexTable = TableDefinition::new("country_code_idx");
pub(crate) const EXCHANGE_RATES: RowTable = TableDefinition::new("exchange_rates");
pub(crate) const RATE_PAIR_IDX: IndexTable = TableDefinition::new("rate_pair_idx");
pub(crate) const RESERVES: RowTable = TableDefinition::new("reserves");
pub(crate) const RESERVE_TXS: RowTable = TableDefinition::new("reserve_txs");
pub(crate) const BASKETS: RowTable = TableDefinition::new("baskets");
pub(crate) const NEWS: RowTable = TableDefinition::new("news");
pub(crate) const NEWS_CATEGORIES: RowTable = TableDefinition::new("news_categories");
pub(crate) const NEWS_CATEGORY_SLUG_IDX: IndexTable =
    TableDefinition::new("news_category_slug_idx");
pub(crate) const ECONOMIC_INDICATORS: RowTable = TableDefinition::new("economic_indicators");

const ALL_ROW_TABLES: &[RowTable] = &[
    PROFILES,
    WALLETS,
    TRANSACTIONS,
    KYC_DOCUMENTS,
    ROLES,
    CURRENCIES,
    COUNTRIES,
    EXCHANGE_RATES,
    RESERVES,
    RESERVE_TXS,
    BASKETS,
    NEWS,
    NEWS_CATEGORIES,
    ECONOMIC_INDICATORS,
];

const ALL_INDEX_TABLES: &[IndexTable] = &[
    PROFILE_EMAIL_IDX,
    ROLE_NAME_IDX,
    CURRENCY_CODE_IDX,
    COUNTRY_CODE_IDX,
    RATE_PAIR_IDX,
    NEWS_CATEGORY_SLUG_IDX,
];

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0}")]
    Invalid(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// PlatformDb
// =============================================================================

/// Embedded ACID row store for all platform resources.
pub struct PlatformDb {
    db: Database,
}

impl PlatformDb {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            for table in ALL_ROW_TABLES {
                let _ = write_txn.open_table(*table)?;
            }
            for table in ALL_INDEX_TABLES {
                let _ = write_txn.open_table(*table)?;
            }
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Direct handle for repository methods that span multiple tables in
    /// one write transaction (e.g. transfer processing).
    pub(crate) fn raw(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Generic row operations
    // =========================================================================

    /// Insert or replace a row.
    pub(crate) fn put<T: Serialize>(
        &self,
        table: RowTable,
        key: &str,
        value: &T,
    ) -> StorageResult<()> {
        let json = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut t = write_txn.open_table(table)?;
            t.insert(key, json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch a row by key.
    pub(crate) fn get<T: DeserializeOwned>(
        &self,
        table: RowTable,
        key: &str,
    ) -> StorageResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(table)?;
        match t.get(key)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Remove a row. Returns whether it existed.
    pub(crate) fn remove(&self, table: RowTable, key: &str) -> StorageResult<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut t = write_txn.open_table(table)?;
            let removed = t.remove(key)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Full scan of a table, deserializing every row.
    pub(crate) fn scan<T: DeserializeOwned>(&self, table: RowTable) -> StorageResult<Vec<T>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(table)?;
        let mut rows = Vec::new();
        for entry in t.iter()? {
            let (_, value) = entry?;
            rows.push(serde_json::from_slice(value.value())?);
        }
        Ok(rows)
    }

    /// Count rows in a table.
    pub(crate) fn count(&self, table: RowTable) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(table)?;
        let mut total = 0u64;
        for entry in t.iter()? {
            entry?;
            total += 1;
        }
        Ok(total)
    }

    // =========================================================================
    // Generic index operations
    // =========================================================================

    pub(crate) fn put_index(
        &self,
        table: IndexTable,
        key: &str,
        id: &str,
    ) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut t = write_txn.open_table(table)?;
            t.insert(key, id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub(crate) fn get_index(&self, table: IndexTable, key: &str) -> StorageResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let t = read_txn.open_table(table)?;
        Ok(t.get(key)?.map(|v| v.value().to_string()))
    }

    pub(crate) fn remove_index(&self, table: IndexTable, key: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut t = write_txn.open_table(table)?;
            t.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
        value: u32,
    }

    fn open_db() -> (PlatformDb, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let db = PlatformDb::open(&dir.path().join("platform.redb")).expect("open db");
        (db, dir)
    }

    #[test]
    fn put_get_remove_roundtrip() {
        let (db, _dir) = open_db();
        let row = Row { id: "a".into(), value: 1 };

        db.put(PROFILES, "a", &row).unwrap();
        let loaded: Option<Row> = db.get(PROFILES, "a").unwrap();
        assert_eq!(loaded, Some(row));

        assert!(db.remove(PROFILES, "a").unwrap());
        assert!(!db.remove(PROFILES, "a").unwrap());
        let gone: Option<Row> = db.get(PROFILES, "a").unwrap();
        assert!(gone.is_none());
    }

    #[test]
    fn scan_and_count() {
        let (db, _dir) = open_db();
        for i in 0..5u32 {
            let row = Row { id: format!("id-{i}"), value: i };
            db.put(WALLETS, &row.id.clone(), &row).unwrap();
        }
        let rows: Vec<Row> = db.scan(WALLETS).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(db.count(WALLETS).unwrap(), 5);
    }

    #[test]
    fn index_operations() {
        let (db, _dir) = open_db();
        db.put_index(PROFILE_EMAIL_IDX, "a@example.com", "id-1").unwrap();
        assert_eq!(
            db.get_index(PROFILE_EMAIL_IDX, "a@example.com").unwrap(),
            Some("id-1".to_string())
        );
        db.remove_index(PROFILE_EMAIL_IDX, "a@example.com").unwrap();
        assert_eq!(db.get_index(PROFILE_EMAIL_IDX, "a@example.com").unwrap(), None);
    }

    #[test]
    fn reopen_preserves_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("platform.redb");
        {
            let db = PlatformDb::open(&path).unwrap();
            db.put(CURRENCIES, "c1", &Row { id: "c1".into(), value: 3 }).unwrap();
        }
        let db = PlatformDb::open(&path).unwrap();
        let loaded: Option<Row> = db.get(CURRENCIES, "c1").unwrap();
        assert_eq!(loaded.unwrap().value, 3);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Reserve holdings backing the platform unit, reserve transactions, and
//! basket compositions.
//!
//! The "current" basket is the composition with the most recent effective
//! date. New compositions must weigh gold + USD + EUR to 100 within a
//! 0.01 tolerance; that check lives in the API validation layer, the
//! repository trusts its input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::db::{PlatformDb, StorageError, StorageResult, BASKETS, RESERVES, RESERVE_TXS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Gold,
    Usd,
    Eur,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReserveTxKind {
    Deposit,
    Withdrawal,
    Rebalance,
    AuditAdjustment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReserveTxStatus {
    Pending,
    Approved,
    Executed,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reserve {
    pub id: Uuid,
    pub asset_type: AssetType,
    pub amount: f64,
    pub custody_provider: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReserveTransaction {
    pub id: Uuid,
    pub transaction_type: ReserveTxKind,
    pub asset_type: AssetType,
    pub amount: f64,
    pub reason: Option<String>,
    pub status: ReserveTxStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BasketComposition {
    pub id: Uuid,
    pub gold_weight: f64,
    pub usd_weight: f64,
    pub eur_weight: f64,
    pub effective_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

pub struct ReserveRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> ReserveRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    // =========================================================================
    // Reserves
    // =========================================================================

    pub fn create_reserve(
        &self,
        asset_type: AssetType,
        amount: f64,
        custody_provider: Option<String>,
        location: Option<String>,
    ) -> StorageResult<Reserve> {
        let now = Utc::now();
        let reserve = Reserve {
            id: Uuid::new_v4(),
            asset_type,
            amount,
            custody_provider,
            location,
            created_at: now,
            updated_at: now,
        };
        self.db.put(RESERVES, &reserve.id.to_string(), &reserve)?;
        Ok(reserve)
    }

    pub fn get_reserve(&self, id: Uuid) -> StorageResult<Reserve> {
        self.db
            .get(RESERVES, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("Reserve {id}")))
    }

    pub fn list_reserves(&self) -> StorageResult<Vec<Reserve>> {
        let mut rows: Vec<Reserve> = self.db.scan(RESERVES)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub fn update_reserve(
        &self,
        id: Uuid,
        amount: Option<f64>,
        custody_provider: Option<Option<String>>,
        location: Option<Option<String>>,
    ) -> StorageResult<Reserve> {
        let mut reserve = self.get_reserve(id)?;
        if let Some(v) = amount {
            reserve.amount = v;
        }
        if let Some(v) = custody_provider {
            reserve.custody_provider = v;
        }
        if let Some(v) = location {
            reserve.location = v;
        }
        reserve.updated_at = Utc::now();
        self.db.put(RESERVES, &id.to_string(), &reserve)?;
        Ok(reserve)
    }

    /// Total reserve amount per asset type.
    pub fn totals(&self) -> StorageResult<Vec<(AssetType, f64)>> {
        let mut gold = 0.0;
        let mut usd = 0.0;
        let mut eur = 0.0;
        for r in self.list_reserves()? {
            match r.asset_type {
                AssetType::Gold => gold += r.amount,
                AssetType::Usd => usd += r.amount,
                AssetType::Eur => eur += r.amount,
            }
        }
        Ok(vec![
            (AssetType::Gold, gold),
            (AssetType::Usd, usd),
            (AssetType::Eur, eur),
        ])
    }

    // =========================================================================
    // Reserve transactions
    // =========================================================================

    pub fn create_transaction(
        &self,
        transaction_type: ReserveTxKind,
        asset_type: AssetType,
        amount: f64,
        reason: Option<String>,
        created_by: Uuid,
    ) -> StorageResult<ReserveTransaction> {
        let now = Utc::now();
        let tx = ReserveTransaction {
            id: Uuid::new_v4(),
            transaction_type,
            asset_type,
            amount,
            reason,
            status: ReserveTxStatus::Pending,
            created_by,
            created_at: now,
            updated_at: now,
        };
        self.db.put(RESERVE_TXS, &tx.id.to_string(), &tx)?;
        Ok(tx)
    }

    pub fn get_transaction(&self, id: Uuid) -> StorageResult<ReserveTransaction> {
        self.db
            .get(RESERVE_TXS, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("Reserve transaction {id}")))
    }

    pub fn list_transactions(&self) -> StorageResult<Vec<ReserveTransaction>> {
        let mut rows: Vec<ReserveTransaction> = self.db.scan(RESERVE_TXS)?;
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    /// Status transitions: pending → approved/rejected, approved → executed.
    pub fn set_transaction_status(
        &self,
        id: Uuid,
        status: ReserveTxStatus,
    ) -> StorageResult<ReserveTransaction> {
        let mut tx = self.get_transaction(id)?;
        let allowed = matches!(
            (tx.status, status),
            (ReserveTxStatus::Pending, ReserveTxStatus::Approved)
                | (ReserveTxStatus::Pending, ReserveTxStatus::Rejected)
                | (ReserveTxStatus::Approved, ReserveTxStatus::Executed)
        );
        if !allowed {
            return Err(StorageError::Invalid(format!(
                "Cannot move reserve transaction from {:?} to {:?}",
                tx.status, status
            )));
        }
        tx.status = status;
        tx.updated_at = Utc::now();
        self.db.put(RESERVE_TXS, &id.to_string(), &tx)?;
        Ok(tx)
    }

    // =========================================================================
    // Basket compositions
    // =========================================================================

    pub fn create_basket(
        &self,
        gold_weight: f64,
        usd_weight: f64,
        eur_weight: f64,
        effective_date: DateTime<Utc>,
        reason: Option<String>,
        created_by: Uuid,
    ) -> StorageResult<BasketComposition> {
        let basket = BasketComposition {
            id: Uuid::new_v4(),
            gold_weight,
            usd_weight,
            eur_weight,
            effective_date,
            reason,
            created_by,
            created_at: Utc::now(),
        };
        self.db.put(BASKETS, &basket.id.to_string(), &basket)?;
        Ok(basket)
    }

    /// Full composition history, most recent effective date first.
    pub fn basket_history(&self) -> StorageResult<Vec<BasketComposition>> {
        let mut rows: Vec<BasketComposition> = self.db.scan(BASKETS)?;
        rows.sort_by(|a, b| b.effective_date.cmp(&a.effective_date));
        Ok(rows)
    }

    pub fn current_basket(&self) -> StorageResult<Option<BasketComposition>> {
        Ok(self.basket_history()?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn open_db() -> (PlatformDb, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = PlatformDb::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    #[test]
    fn totals_sum_per_asset() {
        let (db, _dir) = open_db();
        let repo = ReserveRepository::new(&db);
        repo.create_reserve(AssetType::Gold, 10.0, None, None).unwrap();
        repo.create_reserve(AssetType::Gold, 5.0, None, None).unwrap();
        repo.create_reserve(AssetType::Usd, 100.0, None, None).unwrap();

        let totals = repo.totals().unwrap();
        assert!(totals.contains(&(AssetType::Gold, 15.0)));
        assert!(totals.contains(&(AssetType::Usd, 100.0)));
        assert!(totals.contains(&(AssetType::Eur, 0.0)));
    }

    #[test]
    fn transaction_status_transitions_are_guarded() {
        let (db, _dir) = open_db();
        let repo = ReserveRepository::new(&db);
        let admin = Uuid::new_v4();
        let tx = repo
            .create_transaction(ReserveTxKind::Deposit, AssetType::Usd, 1.0, None, admin)
            .unwrap();

        // pending → executed is not allowed
        let err = repo
            .set_transaction_status(tx.id, ReserveTxStatus::Executed)
            .unwrap_err();
        assert!(matches!(err, StorageError::Invalid(_)));

        repo.set_transaction_status(tx.id, ReserveTxStatus::Approved).unwrap();
        let done = repo
            .set_transaction_status(tx.id, ReserveTxStatus::Executed)
            .unwrap();
        assert_eq!(done.status, ReserveTxStatus::Executed);

        // executed is terminal
        assert!(repo
            .set_transaction_status(tx.id, ReserveTxStatus::Rejected)
            .is_err());
    }

    #[test]
    fn current_basket_is_latest_effective() {
        let (db, _dir) = open_db();
        let repo = ReserveRepository::new(&db);
        let admin = Uuid::new_v4();
        let now = Utc::now();

        repo.create_basket(40.0, 30.0, 30.0, now - Duration::days(30), None, admin)
            .unwrap();
        let latest = repo
            .create_basket(50.0, 25.0, 25.0, now, None, admin)
            .unwrap();

        assert_eq!(repo.current_basket().unwrap().unwrap().id, latest.id);
        assert_eq!(repo.basket_history().unwrap().len(), 2);
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Exchange rates keyed by currency pair.
//!
//! One row per ordered pair; `upsert` replaces the previous rate for that
//! pair instead of accumulating history. The pair index key is
//! `"FROM->TO"` with both codes uppercased.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::db::{PlatformDb, StorageError, StorageResult, EXCHANGE_RATES, RATE_PAIR_IDX};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExchangeRate {
    pub id: Uuid,
    pub from_currency: String,
    pub to_currency: String,
    pub rate: f64,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn pair_key(from: &str, to: &str) -> String {
    format!("{}->{}", from.to_uppercase(), to.to_uppercase())
}

pub struct ExchangeRateRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> ExchangeRateRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    /// Insert or replace the rate for a pair.
    pub fn upsert(
        &self,
        from_currency: String,
        to_currency: String,
        rate: f64,
        source: Option<String>,
    ) -> StorageResult<ExchangeRate> {
        let from = from_currency.to_uppercase();
        let to = to_currency.to_uppercase();
        let key = pair_key(&from, &to);
        let now = Utc::now();

        let row = match self.db.get_index(RATE_PAIR_IDX, &key)? {
            Some(id) => {
                let mut existing: ExchangeRate = self
                    .db
                    .get(EXCHANGE_RATES, &id)?
                    .ok_or_else(|| StorageError::NotFound(format!("Exchange rate {key}")))?;
                existing.rate = rate;
                existing.source = source;
                existing.updated_at = now;
                existing
            }
            None => ExchangeRate {
                id: Uuid::new_v4(),
                from_currency: from,
                to_currency: to,
                rate,
                source,
                created_at: now,
                updated_at: now,
            },
        };
        self.db.put(EXCHANGE_RATES, &row.id.to_string(), &row)?;
        self.db.put_index(RATE_PAIR_IDX, &key, &row.id.to_string())?;
        Ok(row)
    }

    pub fn get(&self, id: Uuid) -> StorageResult<ExchangeRate> {
        self.db
            .get(EXCHANGE_RATES, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("Exchange rate {id}")))
    }

    pub fn find_pair(&self, from: &str, to: &str) -> StorageResult<Option<ExchangeRate>> {
        match self.db.get_index(RATE_PAIR_IDX, &pair_key(from, to))? {
            Some(id) => self.db.get(EXCHANGE_RATES, &id),
            None => Ok(None),
        }
    }

    pub fn list(&self) -> StorageResult<Vec<ExchangeRate>> {
        let mut rows: Vec<ExchangeRate> = self.db.scan(EXCHANGE_RATES)?;
        rows.sort_by(|a, b| {
            (a.from_currency.as_str(), a.to_currency.as_str())
                .cmp(&(b.from_currency.as_str(), b.to_currency.as_str()))
        });
        Ok(rows)
    }

    /// Convert an amount through the stored direct pair rate. Returns
    /// the rate row used alongside the converted amount.
    pub fn convert(&self, from: &str, to: &str, amount: f64) -> StorageResult<(ExchangeRate, f64)> {
        let rate = self.find_pair(from, to)?.ok_or_else(|| {
            StorageError::NotFound(format!(
                "Exchange rate {}",
                pair_key(from, to)
            ))
        })?;
        let converted = amount * rate.rate;
        Ok((rate, converted))
    }

    pub fn delete(&self, id: Uuid) -> StorageResult<()> {
        let row = self.get(id)?;
        self.db
            .remove_index(RATE_PAIR_IDX, &pair_key(&row.from_currency, &row.to_currency))?;
        self.db.remove(EXCHANGE_RATES, &id.to_string())?;
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
    fn upsert_replaces_pair_rate() {
        let (db, _dir) = open_db();
        let repo = ExchangeRateRepository::new(&db);
        let first = repo
            .upsert("usd".into(), "eur".into(), 0.9, Some("ecb".into()))
            .unwrap();
        let second = repo.upsert("USD".into(), "EUR".into(), 0.95, None).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.list().unwrap().len(), 1);
        assert_eq!(repo.find_pair("usd", "eur").unwrap().unwrap().rate, 0.95);
    }

    #[test]
    fn pairs_are_directional() {
        let (db, _dir) = open_db();
        let repo = ExchangeRateRepository::new(&db);
        repo.upsert("USD".into(), "EUR".into(), 0.9, None).unwrap();

        assert!(repo.find_pair("EUR", "USD").unwrap().is_none());
        assert!(matches!(
            repo.convert("EUR", "USD", 1.0).unwrap_err(),
            StorageError::NotFound(_)
        ));
    }

    #[test]
    fn convert_multiplies_through_rate() {
        let (db, _dir) = open_db();
        let repo = ExchangeRateRepository::new(&db);
        repo.upsert("USD".into(), "EUR".into(), 0.5, None).unwrap();
        let (rate, converted) = repo.convert("USD", "EUR", 40.0).unwrap();
        assert_eq!(rate.rate, 0.5);
        assert_eq!(converted, 20.0);
    }
}

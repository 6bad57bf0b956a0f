// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fiat currency reference data. Codes are stored uppercase and unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::db::{PlatformDb, StorageError, StorageResult, CURRENCIES, CURRENCY_CODE_IDX};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Currency {
    pub id: Uuid,
    /// ISO 4217 code, uppercase.
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub country_code: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct CurrencyRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> CurrencyRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    pub fn create(
        &self,
        code: String,
        name: String,
        symbol: String,
        country_code: String,
        is_active: bool,
    ) -> StorageResult<Currency> {
        let code = code.to_uppercase();
        if self.db.get_index(CURRENCY_CODE_IDX, &code)?.is_some() {
            return Err(StorageError::AlreadyExists(format!("Currency {code}")));
        }
        let now = Utc::now();
        let currency = Currency {
            id: Uuid::new_v4(),
            code,
            name,
            symbol,
            country_code: country_code.to_uppercase(),
            is_active,
            created_at: now,
            updated_at: now,
        };
        self.db
            .put(CURRENCIES, &currency.id.to_string(), &currency)?;
        self.db
            .put_index(CURRENCY_CODE_IDX, &currency.code, &currency.id.to_string())?;
        Ok(currency)
    }

    pub fn get(&self, id: Uuid) -> StorageResult<Currency> {
        self.db
            .get(CURRENCIES, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("Currency {id}")))
    }

    pub fn find_by_code(&self, code: &str) -> StorageResult<Option<Currency>> {
        match self.db.get_index(CURRENCY_CODE_IDX, &code.to_uppercase())? {
            Some(id) => self.db.get(CURRENCIES, &id),
            None => Ok(None),
        }
    }

    /// All currencies, code order. `active_only` filters to `is_active`.
    pub fn list(&self, active_only: bool) -> StorageResult<Vec<Currency>> {
        let mut rows: Vec<Currency> = self.db.scan(CURRENCIES)?;
        if active_only {
            rows.retain(|c| c.is_active);
        }
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(rows)
    }

    pub fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        symbol: Option<String>,
        is_active: Option<bool>,
    ) -> StorageResult<Currency> {
        let mut currency = self.get(id)?;
        if let Some(v) = name {
            currency.name = v;
        }
        if let Some(v) = symbol {
            currency.symbol = v;
        }
        if let Some(v) = is_active {
            currency.is_active = v;
        }
        currency.updated_at = Utc::now();
        self.db.put(CURRENCIES, &id.to_string(), &currency)?;
        Ok(currency)
    }

    pub fn delete(&self, id: Uuid) -> StorageResult<()> {
        let currency = self.get(id)?;
        self.db.remove_index(CURRENCY_CODE_IDX, &currency.code)?;
        self.db.remove(CURRENCIES, &id.to_string())?;
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
    fn code_is_uppercased_and_unique() {
        let (db, _dir) = open_db();
        let repo = CurrencyRepository::new(&db);
        let c = repo
            .create("usd".into(), "US Dollar".into(), "$".into(), "us".into(), true)
            .unwrap();
        assert_eq!(c.code, "USD");
        assert_eq!(c.country_code, "US");

        let err = repo
            .create("USD".into(), "Dollar".into(), "$".into(), "US".into(), true)
            .unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists(_)));

        assert!(repo.find_by_code("usd").unwrap().is_some());
    }

    #[test]
    fn active_only_filter() {
        let (db, _dir) = open_db();
        let repo = CurrencyRepository::new(&db);
        repo.create("USD".into(), "US Dollar".into(), "$".into(), "US".into(), true)
            .unwrap();
        let eur = repo
            .create("EUR".into(), "Euro".into(), "€".into(), "EU".into(), true)
            .unwrap();
        repo.update(eur.id, None, None, Some(false)).unwrap();

        assert_eq!(repo.list(true).unwrap().len(), 1);
        assert_eq!(repo.list(false).unwrap().len(), 2);
    }
}

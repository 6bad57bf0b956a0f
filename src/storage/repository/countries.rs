// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Country reference data. Codes are stored uppercase and unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::db::{PlatformDb, StorageError, StorageResult, COUNTRIES, COUNTRY_CODE_IDX};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Country {
    pub id: Uuid,
    /// ISO 3166-1 alpha-2 code, uppercase.
    pub code: String,
    pub name: String,
    pub currency_code: String,
    pub flag_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct CountryRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> CountryRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    pub fn create(
        &self,
        code: String,
        name: String,
        currency_code: String,
        flag_url: Option<String>,
        is_active: bool,
    ) -> StorageResult<Country> {
        let code = code.to_uppercase();
        if self.db.get_index(COUNTRY_CODE_IDX, &code)?.is_some() {
            return Err(StorageError::AlreadyExists(format!("Country {code}")));
        }
        let now = Utc::now();
        let country = Country {
            id: Uuid::new_v4(),
            code,
            name,
            currency_code: currency_code.to_uppercase(),
            flag_url,
            is_active,
            created_at: now,
            updated_at: now,
        };
        self.db.put(COUNTRIES, &country.id.to_string(), &country)?;
        self.db
            .put_index(COUNTRY_CODE_IDX, &country.code, &country.id.to_string())?;
        Ok(country)
    }

    pub fn get(&self, id: Uuid) -> StorageResult<Country> {
        self.db
            .get(COUNTRIES, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("Country {id}")))
    }

    pub fn find_by_code(&self, code: &str) -> StorageResult<Option<Country>> {
        match self.db.get_index(COUNTRY_CODE_IDX, &code.to_uppercase())? {
            Some(id) => self.db.get(COUNTRIES, &id),
            None => Ok(None),
        }
    }

    pub fn list(&self, active_only: bool) -> StorageResult<Vec<Country>> {
        let mut rows: Vec<Country> = self.db.scan(COUNTRIES)?;
        if active_only {
            rows.retain(|c| c.is_active);
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    pub fn update(
        &self,
        id: Uuid,
        name: Option<String>,
        currency_code: Option<String>,
        flag_url: Option<Option<String>>,
        is_active: Option<bool>,
    ) -> StorageResult<Country> {
        let mut country = self.get(id)?;
        if let Some(v) = name {
            country.name = v;
        }
        if let Some(v) = currency_code {
            country.currency_code = v.to_uppercase();
        }
        if let Some(v) = flag_url {
            country.flag_url = v;
        }
        if let Some(v) = is_active {
            country.is_active = v;
        }
        country.updated_at = Utc::now();
        self.db.put(COUNTRIES, &id.to_string(), &country)?;
        Ok(country)
    }

    pub fn delete(&self, id: Uuid) -> StorageResult<()> {
        let country = self.get(id)?;
        self.db.remove_index(COUNTRY_CODE_IDX, &country.code)?;
        self.db.remove(COUNTRIES, &id.to_string())?;
        Ok(())
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Economic indicator reference data, keyed by country and indicator
//! kind with a free-form reporting period ("2026-Q1", "2025").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::storage::db::{PlatformDb, StorageError, StorageResult, ECONOMIC_INDICATORS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Gdp,
    Inflation,
    Unemployment,
    InterestRate,
    TradeBalance,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EconomicIndicator {
    pub id: Uuid,
    /// ISO 3166-1 alpha-2, uppercase.
    pub country_code: String,
    pub indicator_type: IndicatorKind,
    pub value: f64,
    pub period: String,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct EconomicIndicatorRepository<'a> {
    db: &'a PlatformDb,
}

impl<'a> EconomicIndicatorRepository<'a> {
    pub fn new(db: &'a PlatformDb) -> Self {
        Self { db }
    }

    pub fn create(
        &self,
        country_code: String,
        indicator_type: IndicatorKind,
        value: f64,
        period: String,
        source: Option<String>,
    ) -> StorageResult<EconomicIndicator> {
        let now = Utc::now();
        let indicator = EconomicIndicator {
            id: Uuid::new_v4(),
            country_code: country_code.to_uppercase(),
            indicator_type,
            value,
            period,
            source,
            created_at: now,
            updated_at: now,
        };
        self.db
            .put(ECONOMIC_INDICATORS, &indicator.id.to_string(), &indicator)?;
        Ok(indicator)
    }

    pub fn get(&self, id: Uuid) -> StorageResult<EconomicIndicator> {
        self.db
            .get(ECONOMIC_INDICATORS, &id.to_string())?
            .ok_or_else(|| StorageError::NotFound(format!("Economic indicator {id}")))
    }

    /// All indicators, newest first, optionally narrowed by country
    /// and/or kind.
    pub fn list(
        &self,
        country_code: Option<&str>,
        indicator_type: Option<IndicatorKind>,
    ) -> StorageResult<Vec<EconomicIndicator>> {
        let mut rows: Vec<EconomicIndicator> = self.db.scan(ECONOMIC_INDICATORS)?;
        if let Some(code) = country_code {
            let code = code.to_uppercase();
            rows.retain(|i| i.country_code == code);
        }
        if let Some(kind) = indicator_type {
            rows.retain(|i| i.indicator_type == kind);
        }
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    pub fn update(
        &self,
        id: Uuid,
        value: Option<f64>,
        period: Option<String>,
        source: Option<Option<String>>,
    ) -> StorageResult<EconomicIndicator> {
        let mut indicator = self.get(id)?;
        if let Some(v) = value {
            indicator.value = v;
        }
        if let Some(v) = period {
            indicator.period = v;
        }
        if let Some(v) = source {
            indicator.source = v;
        }
        indicator.updated_at = Utc::now();
        self.db
            .put(ECONOMIC_INDICATORS, &id.to_string(), &indicator)?;
        Ok(indicator)
    }

    pub fn delete(&self, id: Uuid) -> StorageResult<()> {
        if !self.db.remove(ECONOMIC_INDICATORS, &id.to_string())? {
            return Err(StorageError::NotFound(format!("Economic indicator {id}")));
        }
        Ok(())
    }
}

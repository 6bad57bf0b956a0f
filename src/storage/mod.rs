// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Platform Storage Module
//!
//! Persistent storage backed by **redb** (pure Rust, ACID). One table per
//! resource, rows serialized as JSON, plus string index tables for
//! unique-key lookups (email, currency code, rate pair, ...).
//!
//! ## Table Layout
//!
//! ```text
//! platform.redb
//!   profiles            id → Profile
//!   profile_email_idx   normalized email → id
//!   wallets             id → Wallet
//!   transactions        id → TransactionRecord
//!   kyc_documents       id → KycDocument
//!   roles               id → RoleRecord
//!   role_name_idx       name → id
//!   currencies          id → Currency
//!   currency_code_idx   code → id
//!   countries           id → Country
//!   country_code_idx    code → id
//!   exchange_rates      id → ExchangeRate
//!   rate_pair_idx       "FROM->TO" → id
//!   reserves            id → Reserve
//!   reserve_txs         id → ReserveTransaction
//!   baskets             id → BasketComposition
//!   news                id → NewsArticle
//!   news_categories     id → NewsCategory
//!   news_category_slug_idx  slug → id
//!   economic_indicators id → EconomicIndicator
//! ```
//!
//! Multi-row invariants (transfer processing: debit + credit + status) run
//! inside a single redb write transaction so a crash can never leave the
//! ledger half-applied.

pub mod db;
pub mod repository;

pub use db::{PlatformDb, StorageError, StorageResult};
pub use repository::countries::{Country, CountryRepository};
pub use repository::currencies::{Currency, CurrencyRepository};
pub use repository::economic_indicators::{
    EconomicIndicator, EconomicIndicatorRepository, IndicatorKind,
};
pub use repository::exchange_rates::{ExchangeRate, ExchangeRateRepository};
pub use repository::news::{NewsArticle, NewsRepository};
pub use repository::news_categories::{NewsCategory, NewsCategoryRepository};
pub use repository::kyc::{DocumentType, KycDocument, KycRepository, ReviewStatus};
pub use repository::profiles::{KycStatus, Profile, ProfileRepository, ProfileResponse};
pub use repository::reserves::{
    AssetType, BasketComposition, Reserve, ReserveRepository, ReserveTransaction,
    ReserveTxKind, ReserveTxStatus,
};
pub use repository::roles::{RoleRecord, RoleRepository};
pub use repository::transactions::{
    TransactionRecord, TransactionRepository, TxKind, TxStatus,
};
pub use repository::wallets::{Wallet, WalletRepository, WalletResponse};

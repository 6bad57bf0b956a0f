// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed repositories over [`super::db::PlatformDb`].
//!
//! Each repository borrows the database and exposes the operations the API
//! layer needs; entity types live next to the repository that owns them.

pub mod countries;
pub mod currencies;
pub mod economic_indicators;
pub mod exchange_rates;
pub mod kyc;
pub mod news;
pub mod news_categories;
pub mod profiles;
pub mod reserves;
pub mod roles;
pub mod transactions;
pub mod wallets;

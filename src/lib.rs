// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ACT Platform - Basket-Backed Currency Service
//!
//! REST backend for a fiat platform whose unit of account is backed by a
//! gold / USD / EUR reserve basket. Every request flows through the same
//! pipeline: rate limiter, route guard (JWT identity + role policy),
//! schema validation, handler, response envelope.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Session JWT identity, role policy, route guard
//! - `rate_limit` - Fixed-window request limiter
//! - `storage` - Embedded redb store and typed repositories
//! - `validate` - Declarative request validation
//! - `response` - The uniform response envelope

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod pagination;
pub mod rate_limit;
pub mod response;
pub mod state;
pub mod storage;
pub mod validate;

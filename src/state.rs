// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared application state.

use std::sync::Arc;

use crate::rate_limit::FixedWindowLimiter;
use crate::storage::PlatformDb;

/// Session-token verification settings.
pub struct AuthConfig {
    /// HS256 signing secret. `None` only makes sense with the `dev`
    /// feature, where tokens are structure-checked but not verified.
    pub secret: Option<Vec<u8>>,
}

/// State shared across all request handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PlatformDb>,
    pub auth: Arc<AuthConfig>,
    pub limiter: Arc<FixedWindowLimiter>,
    /// At-rest AEAD key for wallet secrets; wallet keypair generation is
    /// unavailable without it.
    pub encryption_key: Option<[u8; 32]>,
}

impl AppState {
    pub fn new(
        db: Arc<PlatformDb>,
        auth: AuthConfig,
        limiter: Arc<FixedWindowLimiter>,
        encryption_key: Option<[u8; 32]>,
    ) -> Self {
        Self {
            db,
            auth: Arc::new(auth),
            limiter,
            encryption_key,
        }
    }
}

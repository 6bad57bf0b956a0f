// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory for the embedded database | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SESSION_SECRET` | HS256 key for session JWT verification | Required for production |
//! | `ENCRYPTION_KEY` | Base64 32-byte key for at-rest wallet secrets | Required for key generation |
//! | `DEV_MODE` | Echo internal error messages in 500 bodies | off |
//! | `RATE_LIMIT_MAX` | Max requests per fixed window | `100` |
//! | `RATE_LIMIT_WINDOW_MS` | Fixed window length in milliseconds | `60000` |
//! | `SEED_ADMIN_EMAIL` | Bootstrap an admin profile at startup | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

/// Environment variable name for the database directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the HS256 session token secret.
pub const SESSION_SECRET_ENV: &str = "SESSION_SECRET";

/// Environment variable name for the at-rest encryption key (base64, 32 bytes).
pub const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";

/// Environment variable name for the development-mode flag.
pub const DEV_MODE_ENV: &str = "DEV_MODE";

/// Environment variable name for the per-window request ceiling.
pub const RATE_LIMIT_MAX_ENV: &str = "RATE_LIMIT_MAX";

/// Environment variable name for the rate-limit window length.
pub const RATE_LIMIT_WINDOW_MS_ENV: &str = "RATE_LIMIT_WINDOW_MS";

/// Environment variable name for the bootstrap admin email.
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";

/// Default database directory.
pub const DEFAULT_DATA_DIR: &str = "/data";

/// Default fixed-window rate limit configuration.
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 60_000;

/// Whether development mode is enabled.
///
/// In development mode, 500 responses echo the internal error message
/// instead of the generic redaction.
pub fn dev_mode() -> bool {
    env::var(DEV_MODE_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Database directory from the environment, or the default.
pub fn data_dir() -> String {
    env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string())
}

/// Rate limiter configuration from the environment, with defaults.
pub fn rate_limit_config() -> (u32, u64) {
    let max = env::var(RATE_LIMIT_MAX_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT_MAX);
    let window_ms = env::var(RATE_LIMIT_WINDOW_MS_ENV)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_MS);
    (max, window_ms)
}

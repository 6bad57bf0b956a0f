// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use act_platform_server::api::router;
use act_platform_server::auth::Role;
use act_platform_server::config;
use act_platform_server::crypto;
use act_platform_server::rate_limit::{FixedWindowLimiter, RateLimitConfig};
use act_platform_server::state::{AppState, AuthConfig};
use act_platform_server::storage::{PlatformDb, ProfileRepository};

#[tokio::main]
async fn main() {
    init_tracing();

    // Storage
    let db_path = std::path::Path::new(&config::data_dir()).join("platform.redb");
    let db = Arc::new(PlatformDb::open(&db_path).expect("Failed to open database"));
    tracing::info!(path = %db_path.display(), "database open");

    // Bootstrap admin profile
    if let Ok(email) = env::var(config::SEED_ADMIN_EMAIL_ENV) {
        seed_admin(&db, &email);
    }

    // Session verification
    let secret = env::var(config::SESSION_SECRET_ENV)
        .ok()
        .map(String::into_bytes);
    if secret.is_none() {
        if cfg!(feature = "dev") {
            tracing::warn!("SESSION_SECRET not set; dev mode accepts unsigned tokens");
        } else {
            tracing::warn!("SESSION_SECRET not set; all authenticated routes will reject");
        }
    }

    // At-rest encryption for wallet secrets
    let encryption_key = match env::var(config::ENCRYPTION_KEY_ENV) {
        Ok(value) => match crypto::decode_encryption_key(&value) {
            Ok(key) => Some(key),
            Err(err) => {
                tracing::error!(%err, "invalid ENCRYPTION_KEY; wallet key generation disabled");
                None
            }
        },
        Err(_) => {
            tracing::warn!("ENCRYPTION_KEY not set; wallet key generation disabled");
            None
        }
    };

    // Rate limiter + sweeper
    let (max_requests, window_ms) = config::rate_limit_config();
    let limiter = Arc::new(FixedWindowLimiter::new(RateLimitConfig::new(
        max_requests,
        window_ms,
    )));
    let shutdown = CancellationToken::new();
    limiter.clone().spawn_sweeper(shutdown.clone());

    let state = AppState::new(db, AuthConfig { secret }, limiter, encryption_key);
    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");
    tracing::info!(%addr, "ACT platform server listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(shutdown))
        .await
        .expect("Server failed");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let format = env::var("LOG_FORMAT").unwrap_or_default();
    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Make sure the configured email owns an active admin profile.
fn seed_admin(db: &PlatformDb, email: &str) {
    let email = crypto::normalize_email(email);
    let repo = ProfileRepository::new(db);
    match repo.find_by_email(&email) {
        Ok(Some(profile)) if profile.role == Role::Admin => {}
        Ok(Some(profile)) => {
            if let Err(err) = repo.update(profile.id, None, None, None, Some(Role::Admin), None) {
                tracing::error!(%err, "failed to promote seed admin");
            } else {
                tracing::info!(%email, "existing profile promoted to admin");
            }
        }
        Ok(None) => match repo.create(email.clone(), None, None, Role::Admin, None) {
            Ok(profile) => tracing::info!(%email, admin_id = %profile.id, "seed admin created"),
            Err(err) => tracing::error!(%err, "failed to create seed admin"),
        },
        Err(err) => tracing::error!(%err, "failed to look up seed admin"),
    }
}

/// Resolve on SIGINT or SIGTERM, cancelling background tasks first.
async fn wait_for_shutdown(shutdown: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received");
    shutdown.cancel();
}

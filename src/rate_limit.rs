// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-window request rate limiting.
//!
//! One counter per `(client ip, route path)` pair. `admit` is a single
//! locked check-and-increment, so a burst of concurrent requests can
//! never overshoot the window. Expired windows are reset at lookup time;
//! a background sweeper drops stale entries every 60 seconds so the map
//! does not grow with one-off clients.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::state::AppState;

/// Interval between sweeps of expired windows.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_millis(window_ms),
        }
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Outcome of an admission check.
#[derive(Debug, PartialEq, Eq)]
pub enum Admit {
    Allowed,
    Denied { retry_after_secs: u64 },
}

pub struct FixedWindowLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<(String, String), Window>>,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Check-and-increment for one request.
    pub fn admit(&self, ip: &str, path: &str) -> Admit {
        self.admit_at(ip, path, Instant::now())
    }

    fn admit_at(&self, ip: &str, path: &str, now: Instant) -> Admit {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            // A poisoned lock means a panic mid-update; fail open rather
            // than 429 every request until restart.
            Err(poisoned) => poisoned.into_inner(),
        };
        let key = (ip.to_string(), path.to_string());
        let window = windows.entry(key).or_insert_with(|| Window {
            count: 0,
            reset_at: now + self.config.window,
        });

        if now >= window.reset_at {
            window.count = 0;
            window.reset_at = now + self.config.window;
        }

        if window.count >= self.config.max_requests {
            let remaining = window.reset_at.saturating_duration_since(now);
            return Admit::Denied {
                retry_after_secs: remaining.as_millis().div_ceil(1000) as u64,
            };
        }
        window.count += 1;
        Admit::Allowed
    }

    /// Drop every expired window.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    fn sweep_at(&self, now: Instant) {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        windows.retain(|_, w| w.reset_at > now);
    }

    /// Number of live windows, for tests and stats.
    pub fn tracked(&self) -> usize {
        match self.windows.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Run the periodic sweep until the token is cancelled.
    pub fn spawn_sweeper(self: Arc<Self>, shutdown: CancellationToken) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await; // first tick fires immediately
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.sweep();
                        tracing::trace!(tracked = self.tracked(), "rate limit sweep");
                    }
                    _ = shutdown.cancelled() => {
                        tracing::debug!("rate limit sweeper stopped");
                        return;
                    }
                }
            }
        });
    }
}

/// Best-effort client address: proxy headers first, then "unknown".
fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        return real.trim().to_string();
    }
    "unknown".to_string()
}

/// Middleware applying the limiter to every request.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(request.headers());
    let path = request.uri().path().to_string();

    match state.limiter.admit(&ip, &path) {
        Admit::Allowed => next.run(request).await,
        Admit::Denied { retry_after_secs } => {
            tracing::warn!(%ip, %path, retry_after_secs, "rate limit exceeded");
            ApiError::RateLimited { retry_after_secs }.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32, window_ms: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(RateLimitConfig::new(max, window_ms))
    }

    #[test]
    fn denies_after_max_and_resets_after_window() {
        let l = limiter(3, 1_000);
        let t0 = Instant::now();

        for _ in 0..3 {
            assert_eq!(l.admit_at("1.2.3.4", "/v1/users", t0), Admit::Allowed);
        }
        match l.admit_at("1.2.3.4", "/v1/users", t0) {
            Admit::Denied { retry_after_secs } => assert_eq!(retry_after_secs, 1),
            other => panic!("expected denial, got {other:?}"),
        }

        // Next window admits again
        let t1 = t0 + Duration::from_millis(1_001);
        assert_eq!(l.admit_at("1.2.3.4", "/v1/users", t1), Admit::Allowed);
    }

    #[test]
    fn windows_are_per_ip_and_path() {
        let l = limiter(1, 1_000);
        let t0 = Instant::now();

        assert_eq!(l.admit_at("1.1.1.1", "/a", t0), Admit::Allowed);
        assert_eq!(l.admit_at("1.1.1.1", "/b", t0), Admit::Allowed);
        assert_eq!(l.admit_at("2.2.2.2", "/a", t0), Admit::Allowed);
        assert!(matches!(
            l.admit_at("1.1.1.1", "/a", t0),
            Admit::Denied { .. }
        ));
    }

    #[test]
    fn retry_after_rounds_up() {
        let l = limiter(1, 2_500);
        let t0 = Instant::now();
        l.admit_at("ip", "/p", t0);
        match l.admit_at("ip", "/p", t0 + Duration::from_millis(1_000)) {
            Admit::Denied { retry_after_secs } => assert_eq!(retry_after_secs, 2),
            other => panic!("expected denial, got {other:?}"),
        }
    }

    #[test]
    fn sweep_drops_only_expired_windows() {
        let l = limiter(5, 1_000);
        let t0 = Instant::now();
        l.admit_at("a", "/p", t0);
        l.admit_at("b", "/p", t0 + Duration::from_millis(900));
        assert_eq!(l.tracked(), 2);

        l.sweep_at(t0 + Duration::from_millis(1_500));
        assert_eq!(l.tracked(), 1);

        l.sweep_at(t0 + Duration::from_millis(3_000));
        assert_eq!(l.tracked(), 0);
    }

    #[test]
    fn client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "9.9.9.9, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "8.8.8.8".parse().unwrap());
        assert_eq!(client_ip(&headers), "9.9.9.9");

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "8.8.8.8".parse().unwrap());
        assert_eq!(client_ip(&headers), "8.8.8.8");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Declarative route access policy.
//!
//! One table maps path prefixes to the role set required for safe (GET,
//! HEAD, OPTIONS) and mutating methods. The route guard consults this
//! table instead of every handler doing its own header checks; handler
//! level rules ("owner or admin", transaction `process`) stay in the
//! handlers via the `AdminOnly` extractor.
//!
//! An EMPTY role set means "any authenticated identity". First match
//! wins, so narrower prefixes must precede broader ones.

use axum::http::Method;

use super::Role;

/// Any authenticated identity.
pub const ANY: &[Role] = &[];
/// Administrators only.
pub const ADMIN_ONLY: &[Role] = &[Role::Admin];

/// Path prefixes that bypass the guard entirely.
const PUBLIC_PREFIXES: &[&str] = &["/health", "/docs", "/api-doc", "/v1/auth/login"];

pub struct RoutePolicy {
    pub prefix: &'static str,
    /// Role set for GET / HEAD / OPTIONS.
    pub read: &'static [Role],
    /// Role set for every other method.
    pub write: &'static [Role],
}

/// The policy table. Narrower prefixes first.
pub const ROUTE_POLICIES: &[RoutePolicy] = &[
    RoutePolicy { prefix: "/v1/users/me", read: ANY, write: ANY },
    RoutePolicy { prefix: "/v1/users", read: ADMIN_ONLY, write: ADMIN_ONLY },
    RoutePolicy { prefix: "/v1/admin", read: ADMIN_ONLY, write: ADMIN_ONLY },
    RoutePolicy { prefix: "/v1/roles", read: ADMIN_ONLY, write: ADMIN_ONLY },
    RoutePolicy { prefix: "/v1/wallets", read: ANY, write: ANY },
    RoutePolicy { prefix: "/v1/transactions", read: ANY, write: ANY },
    RoutePolicy { prefix: "/v1/kyc", read: ANY, write: ANY },
    RoutePolicy { prefix: "/v1/currencies", read: ANY, write: ADMIN_ONLY },
    RoutePolicy { prefix: "/v1/countries", read: ANY, write: ADMIN_ONLY },
    RoutePolicy { prefix: "/v1/exchange-rates", read: ANY, write: ADMIN_ONLY },
    RoutePolicy { prefix: "/v1/reserves", read: ANY, write: ADMIN_ONLY },
    // "/v1/news" would also match "/v1/news-categories", keep it second.
    RoutePolicy { prefix: "/v1/news-categories", read: ANY, write: ADMIN_ONLY },
    RoutePolicy { prefix: "/v1/news", read: ANY, write: ADMIN_ONLY },
    RoutePolicy { prefix: "/v1/economic-indicators", read: ANY, write: ADMIN_ONLY },
];

fn is_read(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Role set required for a request. `None` means the route is public.
/// Unmatched paths require authentication so a typo never opens a hole.
pub fn required_roles(method: &Method, path: &str) -> Option<&'static [Role]> {
    if PUBLIC_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return None;
    }
    for policy in ROUTE_POLICIES {
        if path.starts_with(policy.prefix) {
            return Some(if is_read(method) {
                policy.read
            } else {
                policy.write
            });
        }
    }
    Some(ANY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_and_docs_are_public() {
        assert!(required_roles(&Method::GET, "/health").is_none());
        assert!(required_roles(&Method::GET, "/health/ready").is_none());
        assert!(required_roles(&Method::GET, "/docs/index.html").is_none());
    }

    #[test]
    fn me_route_beats_users_prefix() {
        assert_eq!(required_roles(&Method::GET, "/v1/users/me"), Some(ANY));
        assert_eq!(required_roles(&Method::GET, "/v1/users"), Some(ADMIN_ONLY));
        assert_eq!(
            required_roles(&Method::POST, "/v1/users"),
            Some(ADMIN_ONLY)
        );
    }

    #[test]
    fn reference_data_reads_are_open_writes_are_admin() {
        assert_eq!(required_roles(&Method::GET, "/v1/currencies"), Some(ANY));
        assert_eq!(
            required_roles(&Method::POST, "/v1/currencies"),
            Some(ADMIN_ONLY)
        );
        assert_eq!(
            required_roles(&Method::DELETE, "/v1/exchange-rates/abc"),
            Some(ADMIN_ONLY)
        );
        assert_eq!(
            required_roles(&Method::GET, "/v1/reserves/basket"),
            Some(ANY)
        );
        assert_eq!(
            required_roles(&Method::POST, "/v1/reserves/basket"),
            Some(ADMIN_ONLY)
        );
    }

    #[test]
    fn login_is_public() {
        assert!(required_roles(&Method::POST, "/v1/auth/login").is_none());
    }

    #[test]
    fn news_categories_prefix_beats_news() {
        assert_eq!(
            required_roles(&Method::POST, "/v1/news-categories"),
            Some(ADMIN_ONLY)
        );
        assert_eq!(required_roles(&Method::GET, "/v1/news-categories"), Some(ANY));
        assert_eq!(required_roles(&Method::GET, "/v1/news"), Some(ANY));
        assert_eq!(
            required_roles(&Method::PUT, "/v1/news/abc"),
            Some(ADMIN_ONLY)
        );
        assert_eq!(
            required_roles(&Method::POST, "/v1/economic-indicators"),
            Some(ADMIN_ONLY)
        );
    }

    #[test]
    fn unmatched_paths_require_authentication() {
        assert_eq!(required_roles(&Method::GET, "/v1/nope"), Some(ANY));
        assert_eq!(required_roles(&Method::GET, "/anything"), Some(ANY));
    }
}

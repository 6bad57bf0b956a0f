// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token claims and identity resolution.
//!
//! Resolution is deliberately lossy: a missing header, a malformed token
//! and an expired token all resolve to "no identity". The route guard
//! turns "no identity on a protected route" into a single 401; nothing
//! downstream distinguishes the failure modes.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Claims carried in a platform session JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the profile UUID as a string.
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub iat: i64,
    #[serde(default)]
    pub exp: i64,
}

/// Pull the bearer token out of the Authorization header, if any.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the caller's identity from request headers.
///
/// With a configured secret, the token signature and expiry are verified
/// (HS256). Without one, the `dev` build decodes structure only; release
/// builds resolve nothing.
pub fn resolve_identity(headers: &HeaderMap, secret: Option<&[u8]>) -> Option<SessionClaims> {
    let token = bearer_token(headers)?;
    match secret {
        Some(secret) => decode_verified(token, secret),
        None => decode_unverified(token),
    }
}

fn decode_verified(token: &str, secret: &[u8]) -> Option<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    decode::<SessionClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .ok()
        .map(|data| data.claims)
}

/// Development mode: no signature check, manual expiry check.
#[cfg(feature = "dev")]
fn decode_unverified(token: &str) -> Option<SessionClaims> {
    let data = jsonwebtoken::dangerous::insecure_decode::<SessionClaims>(token).ok()?;
    let claims = data.claims;
    let now = chrono::Utc::now().timestamp();
    if claims.exp > 0 && claims.exp < now - CLOCK_SKEW_LEEWAY as i64 {
        return None;
    }
    Some(claims)
}

#[cfg(not(feature = "dev"))]
fn decode_unverified(_token: &str) -> Option<SessionClaims> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &[u8] = b"test-session-secret";

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    fn signed_token(sub: &str, exp_offset_secs: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            sub: sub.to_string(),
            email: "t@example.com".into(),
            iat: now,
            exp: now + exp_offset_secs,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_resolves() {
        let token = signed_token("user-1", 3600);
        let claims = resolve_identity(&headers_with(&token), Some(SECRET)).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "t@example.com");
    }

    #[test]
    fn missing_header_resolves_to_nothing() {
        assert!(resolve_identity(&HeaderMap::new(), Some(SECRET)).is_none());
    }

    #[test]
    fn garbage_token_resolves_to_nothing() {
        assert!(resolve_identity(&headers_with("not.a.jwt"), Some(SECRET)).is_none());
    }

    #[test]
    fn expired_token_resolves_to_nothing() {
        let token = signed_token("user-1", -7200);
        assert!(resolve_identity(&headers_with(&token), Some(SECRET)).is_none());
    }

    #[test]
    fn wrong_signature_resolves_to_nothing() {
        let token = signed_token("user-1", 3600);
        assert!(resolve_identity(&headers_with(&token), Some(b"other-secret")).is_none());
    }

    #[test]
    fn non_bearer_scheme_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(resolve_identity(&headers, Some(SECRET)).is_none());
    }

    #[cfg(feature = "dev")]
    #[test]
    fn dev_mode_accepts_unsigned_structure() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            r#"{"sub":"dev-user","email":"dev@example.com","iat":0,"exp":0}"#,
        );
        let token = format!("{header}.{payload}.forged");

        let claims = resolve_identity(&headers_with(&token), None).unwrap();
        assert_eq!(claims.sub, "dev-user");
    }
}

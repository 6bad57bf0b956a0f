// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The route guard middleware and handler-side extractors.
//!
//! The guard runs before any handler body is read: it resolves the
//! caller's identity, checks the route policy table, loads the profile
//! and stores [`CurrentUser`] in request extensions. Handlers then take
//! `Auth` (any authenticated caller) or `AdminOnly`.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::{claims, policy, Role};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::{Profile, ProfileRepository};

/// The authenticated caller, as placed in request extensions by
/// [`route_guard`].
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Check a loaded profile against a required role set.
///
/// An empty set admits any authenticated identity; otherwise the
/// profile's role must be in the set. Suspended accounts are always
/// denied.
pub fn authorize(profile: &Profile, required: &[Role]) -> Result<(), ApiError> {
    if !profile.is_active {
        return Err(ApiError::forbidden("Account is suspended"));
    }
    if required.is_empty() || required.contains(&profile.role) {
        return Ok(());
    }
    Err(ApiError::forbidden("Admin access required"))
}

/// Middleware enforcing the route policy table.
pub async fn route_guard(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let Some(required) = policy::required_roles(&method, &path) else {
        return next.run(request).await;
    };

    let Some(session) = claims::resolve_identity(request.headers(), state.auth.secret.as_deref())
    else {
        return ApiError::Unauthorized.into_response();
    };
    let Ok(user_id) = Uuid::parse_str(&session.sub) else {
        return ApiError::Unauthorized.into_response();
    };

    let profiles = ProfileRepository::new(&state.db);
    let profile = match profiles.find(user_id) {
        Ok(Some(profile)) => profile,
        Ok(None) => return ApiError::forbidden("User profile not found").into_response(),
        Err(err) => return ApiError::from(err).into_response(),
    };

    if let Err(err) = authorize(&profile, required) {
        return err.into_response();
    }

    let user = CurrentUser {
        id: profile.id,
        email: profile.email,
        role: profile.role,
    };
    request.extensions_mut().insert(user.clone());
    let mut response = next.run(request).await;
    // Echoed into the response so outer layers (request tracking) can
    // attribute the outcome to the caller.
    response.extensions_mut().insert(user);
    response
}

/// Extractor for any authenticated caller.
pub struct Auth(pub CurrentUser);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .map(Auth)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Extractor for administrative handlers whose route policy alone is not
/// strict enough (e.g. processing a transaction on an otherwise
/// user-accessible prefix).
pub struct AdminOnly(pub CurrentUser);

impl<S: Send + Sync> FromRequestParts<S> for AdminOnly {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ApiError::Unauthorized)?;
        if !user.is_admin() {
            return Err(ApiError::forbidden("Admin access required"));
        }
        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::KycStatus;
    use axum::http::StatusCode;
    use chrono::Utc;

    fn profile(role: Role, is_active: bool) -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            email: "p@example.com".into(),
            full_name: None,
            phone: None,
            role,
            is_active,
            kyc_status: KycStatus::Pending,
            password_digest: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_set_admits_any_active_profile() {
        assert!(authorize(&profile(Role::User, true), policy::ANY).is_ok());
        assert!(authorize(&profile(Role::Admin, true), policy::ANY).is_ok());
    }

    #[test]
    fn admin_set_rejects_plain_users() {
        let err = authorize(&profile(Role::User, true), policy::ADMIN_ONLY).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(authorize(&profile(Role::Admin, true), policy::ADMIN_ONLY).is_ok());
    }

    #[test]
    fn suspended_profiles_are_always_denied() {
        let err = authorize(&profile(Role::Admin, false), policy::ANY).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
    }
}

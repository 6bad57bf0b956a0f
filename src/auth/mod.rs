// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication & Authorization Module
//!
//! Session-token authentication and role-based authorization for the
//! platform API.
//!
//! ## Request flow
//!
//! 1. Client sends `Authorization: Bearer <session JWT>` (HS256, signed
//!    with `SESSION_SECRET`)
//! 2. The route guard middleware:
//!    - resolves the identity from the token (absent, malformed and
//!      expired tokens all resolve to "no identity")
//!    - looks up the required role set for the route in the policy table
//!    - loads the caller's profile and checks role + active status
//!    - stores [`CurrentUser`] in request extensions for handlers
//! 3. Handlers use the `Auth` / `AdminOnly` extractors to read the
//!    authenticated user
//!
//! ## Development mode
//!
//! With the `dev` cargo feature and no `SESSION_SECRET` configured,
//! tokens are structure-validated only (no signature check). Production
//! builds without a secret resolve no identities at all.

pub mod claims;
pub mod guard;
pub mod policy;
pub mod roles;

pub use claims::SessionClaims;
pub use guard::{authorize, route_guard, AdminOnly, Auth, CurrentUser};
pub use roles::Role;

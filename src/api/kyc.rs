// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC document submission and review.
//!
//! Submission and own-document listing are open to any authenticated
//! caller. The review queue and the approve / reject decisions are admin
//! operations; decisions propagate to the owner's profile `kyc_status`.

use axum::{
    extract::State,
    response::Response,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{AdminOnly, Auth};
use crate::error::ApiError;
use crate::response;
use crate::state::AppState;
use crate::storage::{
    DocumentType, KycDocument, KycRepository, KycStatus, ProfileRepository, ReviewStatus,
};
use crate::validate::{Checker, FieldError, Path, Validate, ValidJson};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitKycRequest {
    pub document_type: DocumentType,
    pub document_url: String,
}

impl Validate for SubmitKycRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.url("document_url", &self.document_url);
        checker.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectKycRequest {
    pub reason: String,
}

impl Validate for RejectKycRequest {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut checker = Checker::new();
        checker.required("reason", &self.reason);
        checker.max_len("reason", &self.reason, 500);
        checker.finish()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Submit a document for review.
#[utoipa::path(
    post,
    path = "/v1/kyc",
    tag = "KYC",
    security(("bearer" = [])),
    request_body = SubmitKycRequest,
    responses(
        (status = 201, description = "Document submitted", body = KycDocument),
        (status = 422, description = "Validation failed"),
    )
)]
pub async fn submit_document(
    State(state): State<AppState>,
    Auth(user): Auth,
    ValidJson(req): ValidJson<SubmitKycRequest>,
) -> Result<Response, ApiError> {
    let doc = KycRepository::new(&state.db).submit(user.id, req.document_type, req.document_url)?;
    tracing::info!(document_id = %doc.id, user_id = %user.id, "kyc document submitted");
    Ok(response::created(doc))
}

/// List documents: the caller's own, or every document for admins.
#[utoipa::path(
    get,
    path = "/v1/kyc",
    tag = "KYC",
    security(("bearer" = [])),
    responses((status = 200, description = "Documents", body = [KycDocument]))
)]
pub async fn list_documents(
    State(state): State<AppState>,
    Auth(user): Auth,
) -> Result<Response, ApiError> {
    let repo = KycRepository::new(&state.db);
    let docs = if user.is_admin() {
        repo.list()?
    } else {
        repo.list_for_user(user.id)?
    };
    Ok(response::ok(docs))
}

/// The review queue, oldest submission first (admin).
#[utoipa::path(
    get,
    path = "/v1/kyc/pending",
    tag = "KYC",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Pending documents", body = [KycDocument]),
        (status = 403, description = "Admin access required"),
    )
)]
pub async fn pending_documents(
    State(state): State<AppState>,
    AdminOnly(_admin): AdminOnly,
) -> Result<Response, ApiError> {
    Ok(response::ok(KycRepository::new(&state.db).list_pending()?))
}

/// Approve a document (admin). When it was the owner's last outstanding
/// document, the profile's KYC status flips to approved.
#[utoipa::path(
    post,
    path = "/v1/kyc/{id}/approve",
    tag = "KYC",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document approved", body = KycDocument),
        (status = 400, description = "Already reviewed"),
        (status = 404, description = "No such document"),
    )
)]
pub async fn approve_document(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = KycRepository::new(&state.db);
    let doc = repo.review(id, ReviewStatus::Approved, None, admin.id)?;

    if repo.all_approved(doc.user_id)? {
        ProfileRepository::new(&state.db).set_kyc_status(doc.user_id, KycStatus::Approved)?;
        tracing::info!(user_id = %doc.user_id, "kyc fully approved");
    }
    Ok(response::ok(doc))
}

/// Reject a document (admin). The owner's profile KYC status flips to
/// rejected.
#[utoipa::path(
    post,
    path = "/v1/kyc/{id}/reject",
    tag = "KYC",
    security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Document id")),
    request_body = RejectKycRequest,
    responses(
        (status = 200, description = "Document rejected", body = KycDocument),
        (status = 400, description = "Already reviewed"),
        (status = 404, description = "No such document"),
        (status = 422, description = "Missing rejection reason"),
    )
)]
pub async fn reject_document(
    State(state): State<AppState>,
    AdminOnly(admin): AdminOnly,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<RejectKycRequest>,
) -> Result<Response, ApiError> {
    let doc = KycRepository::new(&state.db).review(
        id,
        ReviewStatus::Rejected,
        Some(req.reason),
        admin.id,
    )?;
    ProfileRepository::new(&state.db).set_kyc_status(doc.user_id, KycStatus::Rejected)?;
    tracing::info!(document_id = %id, user_id = %doc.user_id, "kyc document rejected");
    Ok(response::ok(doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_url_must_be_a_url() {
        let req = SubmitKycRequest {
            document_type: DocumentType::Passport,
            document_url: "not a url".into(),
        };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors[0].field, "document_url");
    }

    #[test]
    fn rejection_reason_is_required() {
        let req = RejectKycRequest { reason: "   ".into() };
        let errors = req.validate().unwrap_err();
        assert_eq!(errors[0].field, "reason");
    }
}

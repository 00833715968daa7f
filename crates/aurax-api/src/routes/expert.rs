//! # Expert Verification
//!
//! `POST /v1/expert/verify` runs one verification to completion and
//! returns the authorization decision. The call blocks for as long as the
//! proof toolchain runs.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use aurax_core::VerificationMode;
use aurax_zkp::{VerificationOutcome, VerificationRequest};

use crate::error::AppError;
use crate::extractors::{Validate, ValidatedJson};
use crate::state::AppState;

/// Longest address accepted (RFC 5321 path limit).
const MAX_EMAIL_LEN: usize = 320;

/// Expert verification request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyExpertRequest {
    /// Compact provider token; required when `mode` is `credential`.
    #[serde(default)]
    pub signed_token: Option<String>,
    /// Address whose domain is being proven.
    pub email: String,
    /// `domain` or `credential`.
    #[schema(value_type = String, example = "credential")]
    pub mode: VerificationMode,
}

impl Validate for VerifyExpertRequest {
    fn validate(&self) -> Result<(), String> {
        if self.email.len() > MAX_EMAIL_LEN {
            return Err(format!("email must not exceed {MAX_EMAIL_LEN} bytes"));
        }
        Ok(())
    }
}

impl From<VerifyExpertRequest> for VerificationRequest {
    fn from(req: VerifyExpertRequest) -> Self {
        Self {
            email: req.email,
            mode: req.mode,
            signed_token: req.signed_token,
        }
    }
}

/// Expert verification result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyExpertResponse {
    pub request_id: Uuid,
    pub verified: bool,
    pub privileged: bool,
    pub domain: String,
    #[schema(value_type = String)]
    pub mode: VerificationMode,
    /// Fingerprint of the circuit the proof was checked against.
    pub circuit_fingerprint: String,
    pub completed_at: DateTime<Utc>,
    pub message: String,
}

impl From<VerificationOutcome> for VerifyExpertResponse {
    fn from(outcome: VerificationOutcome) -> Self {
        let message = match (outcome.verified, outcome.privileged, outcome.mode) {
            (false, _, _) => "proof rejected",
            (true, true, _) => "expert status granted",
            (true, false, VerificationMode::Domain) => {
                "domain verified; expert status requires a provider credential"
            }
            (true, false, VerificationMode::Credential) => {
                "credential verified; domain is not on the expert list"
            }
        };
        Self {
            request_id: outcome.request_id,
            verified: outcome.verified,
            privileged: outcome.privileged,
            domain: outcome.domain,
            mode: outcome.mode,
            circuit_fingerprint: outcome.fingerprint,
            completed_at: outcome.completed_at,
            message: message.to_string(),
        }
    }
}

/// Build the expert router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/expert/verify", post(verify_expert))
}

/// POST /v1/expert/verify — Prove domain control or a provider credential.
#[utoipa::path(
    post,
    path = "/v1/expert/verify",
    request_body = VerifyExpertRequest,
    responses(
        (status = 200, description = "Verification completed", body = VerifyExpertResponse),
        (status = 400, description = "Malformed token, invalid email, or toolchain failure", body = crate::error::ErrorBody),
        (status = 422, description = "Unknown key, oversized domain, or witness encoding failure", body = crate::error::ErrorBody),
        (status = 503, description = "Key service unavailable", body = crate::error::ErrorBody),
    ),
    tag = "expert"
)]
pub(crate) async fn verify_expert(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<VerifyExpertRequest>,
) -> Result<Json<VerifyExpertResponse>, AppError> {
    let req = VerificationRequest::from(body);
    let outcome = state.pipeline.verify(&req).await?;
    state
        .metrics
        .record_decision(outcome.verified, outcome.privileged);
    Ok(Json(outcome.into()))
}

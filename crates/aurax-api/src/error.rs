//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps [`AuraxError`] to HTTP status codes. Every error body carries
//! `verified: false` and `privileged: false` next to the error object, so
//! a client that only reads the flags can never mistake a failure for a
//! grant. Internal error details are never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use aurax_core::AuraxError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub verified: bool,
    /// Always `false`.
    pub privileged: bool,
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "MALFORMED_TOKEN", "KEY_NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for some client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// The verification pipeline failed.
    #[error(transparent)]
    Verification(#[from] AuraxError),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::Verification(err) => {
                let status = match err {
                    AuraxError::MalformedToken(_)
                    | AuraxError::InvalidEmail(_)
                    | AuraxError::ProofPipelineFailed { .. } => StatusCode::BAD_REQUEST,
                    AuraxError::KeyNotFound { .. }
                    | AuraxError::DomainTooLong { .. }
                    | AuraxError::WitnessEncoding(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    AuraxError::KeyServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    AuraxError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.code())
            }
        }
    }

    fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Internal(_) | Self::Verification(AuraxError::Internal(_))
        )
    }

    /// Client-facing message and optional details.
    fn public_message(&self) -> (String, Option<serde_json::Value>) {
        match self {
            _ if self.is_internal() => ("An internal error occurred".to_string(), None),
            // Toolchain stderr stays in the logs.
            Self::Verification(AuraxError::ProofPipelineFailed { stage, .. }) => (
                format!("proof pipeline failed at {stage}"),
                Some(serde_json::json!({ "stage": stage.as_str() })),
            ),
            Self::Verification(AuraxError::KeyNotFound { kid }) => (
                self.to_string(),
                Some(serde_json::json!({ "kid": kid })),
            ),
            Self::Verification(AuraxError::DomainTooLong { len, capacity }) => (
                self.to_string(),
                Some(serde_json::json!({ "len": len, "capacity": capacity })),
            ),
            other => (other.to_string(), None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let (message, details) = self.public_message();

        if self.is_internal() {
            tracing::error!(error = %self, "internal server error");
        } else if status.is_server_error() {
            tracing::warn!(code, error = %self, "upstream failure");
        } else {
            tracing::info!(code, error = %self, "request rejected");
        }

        let body = ErrorBody {
            verified: false,
            privileged: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurax_core::PipelineStage;

    fn status_of(err: AuraxError) -> (StatusCode, &'static str) {
        AppError::from(err).status_and_code()
    }

    #[test]
    fn client_errors_map_to_400() {
        assert_eq!(
            status_of(AuraxError::MalformedToken("two parts".into())),
            (StatusCode::BAD_REQUEST, "MALFORMED_TOKEN")
        );
        assert_eq!(
            status_of(AuraxError::InvalidEmail("no @".into())),
            (StatusCode::BAD_REQUEST, "INVALID_EMAIL")
        );
    }

    #[test]
    fn unprocessable_inputs_map_to_422() {
        assert_eq!(
            status_of(AuraxError::KeyNotFound { kid: "k".into() }).0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AuraxError::DomainTooLong {
                len: 70,
                capacity: 64
            })
            .0,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AuraxError::WitnessEncoding("x".into())),
            (StatusCode::UNPROCESSABLE_ENTITY, "WITNESS_ENCODING_ERROR")
        );
    }

    #[test]
    fn key_service_outage_is_503() {
        assert_eq!(
            status_of(AuraxError::KeyServiceUnavailable("timeout".into())),
            (StatusCode::SERVICE_UNAVAILABLE, "KEY_SERVICE_UNAVAILABLE")
        );
    }

    #[test]
    fn pipeline_failure_is_400() {
        let (status, code) = status_of(AuraxError::ProofPipelineFailed {
            stage: PipelineStage::Prove,
            detail: "exit 1".into(),
        });
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "PROOF_PIPELINE_FAILED");
    }

    #[test]
    fn request_errors() {
        assert_eq!(
            AppError::BadRequest("x".into()).status_and_code(),
            (StatusCode::BAD_REQUEST, "BAD_REQUEST")
        );
        assert_eq!(
            AppError::Validation("x".into()).status_and_code(),
            (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
        );
        assert_eq!(
            AppError::Internal("x".into()).status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        );
    }

    #[test]
    fn error_body_skips_empty_details() {
        let body = ErrorBody {
            verified: false,
            privileged: false,
            error: ErrorDetail {
                code: "TEST".to_string(),
                message: "test message".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"verified\":false"));
        assert!(!json.contains("details"));
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_carries_negative_flags() {
        let (status, body) =
            response_parts(AuraxError::MalformedToken("expected 3 segments".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.verified);
        assert!(!body.privileged);
        assert_eq!(body.error.code, "MALFORMED_TOKEN");
        assert!(body.error.message.contains("expected 3 segments"));
    }

    #[tokio::test]
    async fn into_response_hides_toolchain_stderr() {
        let (_, body) = response_parts(
            AuraxError::ProofPipelineFailed {
                stage: PipelineStage::Verify,
                detail: "bb exited 1: /srv/work/secret-path".into(),
            }
            .into(),
        )
        .await;
        assert_eq!(body.error.message, "proof pipeline failed at verify");
        assert_eq!(body.error.details.unwrap()["stage"], "verify");
    }

    #[tokio::test]
    async fn into_response_key_not_found_names_kid() {
        let (_, body) =
            response_parts(AuraxError::KeyNotFound { kid: "abc".into() }.into()).await;
        assert_eq!(body.error.details.unwrap()["kid"], "abc");
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        for err in [
            AppError::Internal("disk full at /var/lib".into()),
            AuraxError::Internal("join error".into()).into(),
        ] {
            let (status, body) = response_parts(err).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body.error.code, "INTERNAL_ERROR");
            assert_eq!(body.error.message, "An internal error occurred");
            assert!(body.error.details.is_none());
        }
    }
}

//! # Error Types — Verification Failure Taxonomy
//!
//! Every stage of a verification request fails fast with one of the
//! variants below. Nothing in the pipeline retries; the caller always
//! receives a structured failure carrying `verified: false`.
//!
//! ## Design
//!
//! - Token and email problems are client errors and carry the reason.
//! - Key-service failures are distinguished from a definitive key miss.
//! - Toolchain failures name the stage that failed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stage of the external proof toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Circuit compilation (cached).
    Compile,
    /// Witness solving and proof generation (per request).
    Prove,
    /// Verification key derivation (cached).
    KeyGenerate,
    /// Proof verification (per request).
    Verify,
}

impl PipelineStage {
    /// Return the stage name used in logs and error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Prove => "prove",
            Self::KeyGenerate => "key_generate",
            Self::Verify => "verify",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for a verification request.
#[derive(Error, Debug)]
pub enum AuraxError {
    /// The signed token is not a three-part compact token, or its header
    /// or claims are not valid base64/JSON.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The email address is missing its `@`, local part, or domain.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// The provider's key set has no key with the token's identifier,
    /// even after a forced refresh.
    #[error("no provider key with id {kid:?}")]
    KeyNotFound {
        /// The key identifier taken from the token header.
        kid: String,
    },

    /// The provider's key set could not be fetched or parsed.
    #[error("key service unavailable: {0}")]
    KeyServiceUnavailable(String),

    /// The UTF-8 domain does not fit the circuit's domain buffer.
    #[error("domain is {len} bytes, circuit capacity is {capacity}")]
    DomainTooLong {
        /// Encoded length of the domain.
        len: usize,
        /// Buffer capacity.
        capacity: usize,
    },

    /// Deriving the circuit witness from the token and key failed.
    #[error("witness encoding error: {0}")]
    WitnessEncoding(String),

    /// An external toolchain stage failed, timed out, or could not start.
    #[error("proof pipeline failed at {stage}: {detail}")]
    ProofPipelineFailed {
        /// The stage that failed.
        stage: PipelineStage,
        /// Failure detail (exit status, stderr tail, or timeout).
        detail: String,
    },

    /// Unexpected failure (I/O in the working directory, join errors).
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuraxError {
    /// Machine-readable error code, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedToken(_) => "MALFORMED_TOKEN",
            Self::InvalidEmail(_) => "INVALID_EMAIL",
            Self::KeyNotFound { .. } => "KEY_NOT_FOUND",
            Self::KeyServiceUnavailable(_) => "KEY_SERVICE_UNAVAILABLE",
            Self::DomainTooLong { .. } => "DOMAIN_TOO_LONG",
            Self::WitnessEncoding(_) => "WITNESS_ENCODING_ERROR",
            Self::ProofPipelineFailed { .. } => "PROOF_PIPELINE_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the failure was caused by the request content rather than
    /// by the service or its dependencies.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedToken(_)
                | Self::InvalidEmail(_)
                | Self::KeyNotFound { .. }
                | Self::DomainTooLong { .. }
                | Self::WitnessEncoding(_)
        )
    }
}

impl From<std::io::Error> for AuraxError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("io error: {err}"))
    }
}

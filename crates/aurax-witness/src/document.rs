//! # Witness Document
//!
//! The full set of circuit inputs for one verification request. The circuit
//! always expects every field, so a domain-only document borrows a single
//! process-wide neutral [`JwtWitness`] instead of rebuilding zero values at
//! each call site.

use std::borrow::Cow;
use std::sync::OnceLock;

use aurax_core::{DomainBuffer, VerificationMode};

use crate::jwt::JwtWitness;

static NEUTRAL_JWT: OnceLock<JwtWitness> = OnceLock::new();

/// The shared zero-valued JWT witness.
pub fn neutral_jwt() -> &'static JwtWitness {
    NEUTRAL_JWT.get_or_init(JwtWitness::neutral)
}

/// Complete circuit input. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessDocument {
    domain: DomainBuffer,
    jwt: Cow<'static, JwtWitness>,
}

impl WitnessDocument {
    /// Document asserting only domain control.
    pub fn domain_only(domain: DomainBuffer) -> Self {
        Self {
            domain,
            jwt: Cow::Borrowed(neutral_jwt()),
        }
    }

    /// Document carrying a real credential.
    pub fn credential(domain: DomainBuffer, jwt: JwtWitness) -> Self {
        Self {
            domain,
            jwt: Cow::Owned(jwt),
        }
    }

    /// Which shape this document has.
    pub fn mode(&self) -> VerificationMode {
        match self.jwt {
            Cow::Borrowed(_) => VerificationMode::Domain,
            Cow::Owned(_) => VerificationMode::Credential,
        }
    }

    pub fn domain(&self) -> &DomainBuffer {
        &self.domain
    }

    pub fn jwt(&self) -> &JwtWitness {
        &self.jwt
    }
}

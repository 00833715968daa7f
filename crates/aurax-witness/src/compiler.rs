//! # Witness Compiler
//!
//! Entry point from validated request data to a [`WitnessDocument`].
//! Compilation is pure: no I/O, no clock, no randomness.

use aurax_core::{AuraxError, DomainBuffer, EmailAddress, PAYLOAD_CAPACITY};
use aurax_jwt::{Jwk, SignedToken};

use crate::document::WitnessDocument;
use crate::jwt::JwtWitness;

/// Claims whose presence the circuit proves by default.
pub const DEFAULT_PRECOMPUTE_KEYS: [&str; 2] = ["email", "email_verified"];

/// Tunables of the credential derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessParams {
    /// Upper bound on signed bytes handed to the circuit.
    pub max_signed_data_len: usize,
    /// Claims that must remain inside the unhashed suffix.
    pub precompute_keys: Vec<String>,
}

impl Default for WitnessParams {
    fn default() -> Self {
        Self {
            max_signed_data_len: PAYLOAD_CAPACITY,
            precompute_keys: DEFAULT_PRECOMPUTE_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// Builds witness documents.
#[derive(Debug, Clone, Default)]
pub struct WitnessCompiler {
    params: WitnessParams,
}

impl WitnessCompiler {
    pub fn new(params: WitnessParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &WitnessParams {
        &self.params
    }

    /// Compile a domain-only witness for `email`.
    ///
    /// Fails with [`AuraxError::DomainTooLong`] when the domain does not
    /// fit the circuit's domain buffer.
    pub fn compile_domain(&self, email: &EmailAddress) -> Result<WitnessDocument, AuraxError> {
        let domain = DomainBuffer::from_domain(email.domain())?;
        Ok(WitnessDocument::domain_only(domain))
    }

    /// Compile a full-credential witness for `email` from `token` and the
    /// provider key that signed it.
    pub fn compile_credential(
        &self,
        email: &EmailAddress,
        token: &SignedToken,
        key: &Jwk,
    ) -> Result<WitnessDocument, AuraxError> {
        let domain = DomainBuffer::from_domain(email.domain())?;
        let jwt = JwtWitness::derive(
            token,
            key,
            self.params.max_signed_data_len,
            &self.params.precompute_keys,
        )?;
        Ok(WitnessDocument::credential(domain, jwt))
    }
}

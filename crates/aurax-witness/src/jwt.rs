//! # Credential Witness Derivation
//!
//! Derives every JWT-side circuit input from one signed token and the
//! provider key that signed it.
//!
//! The signed data is `base64(header) "." base64(payload)`. The circuit
//! must see the claims named in the precompute key list, so everything up
//! to the 64-byte block containing the earliest of those claims is hashed
//! here and only the rest is handed to the circuit as `partial_data`. The
//! circuit base64-decodes `partial_data` starting at `base64_decode_offset`,
//! which must fall on a 4-character group boundary of the payload segment.

use aurax_core::{AuraxError, PayloadBuffer, PAYLOAD_CAPACITY};
use aurax_jwt::{Jwk, SignedToken};

use crate::rsa::RsaLimbs;
use crate::sha256::{PartialHashState, BLOCK_LEN};

/// Signature algorithm the circuit verifies.
pub const SUPPORTED_ALG: &str = "RS256";

/// JWT-side circuit inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwtWitness {
    /// Signed data after the precomputed prefix.
    pub partial_data: PayloadBuffer,
    /// Hash state after the precomputed prefix.
    pub partial_hash: PartialHashState,
    /// Length of the whole signed data.
    pub full_data_length: usize,
    /// Index into `partial_data` where payload base64 decoding starts.
    pub base64_decode_offset: usize,
    /// Modulus, reduction parameter, and signature limbs.
    pub rsa: RsaLimbs,
}

impl JwtWitness {
    /// Neutral values for domain-only proofs: empty payload, zero hash
    /// words, zero lengths, zero limbs.
    pub fn neutral() -> Self {
        Self {
            partial_data: PayloadBuffer::empty(),
            partial_hash: PartialHashState::zeroed(),
            full_data_length: 0,
            base64_decode_offset: 0,
            rsa: RsaLimbs::zero(),
        }
    }

    /// Derive the JWT witness for `token` signed by `key`.
    ///
    /// `max_signed_data_len` bounds the bytes handed to the circuit after
    /// the precomputed prefix. Every key in `precompute_keys` must occur in
    /// the decoded claims.
    pub fn derive(
        token: &SignedToken,
        key: &Jwk,
        max_signed_data_len: usize,
        precompute_keys: &[String],
    ) -> Result<Self, AuraxError> {
        if token.header().alg != SUPPORTED_ALG {
            return Err(AuraxError::WitnessEncoding(format!(
                "unsupported signature algorithm {}",
                token.header().alg
            )));
        }
        if max_signed_data_len > PAYLOAD_CAPACITY {
            return Err(AuraxError::WitnessEncoding(format!(
                "max signed data length {max_signed_data_len} exceeds circuit capacity {PAYLOAD_CAPACITY}"
            )));
        }

        let signed = token.signed_data();
        let payload_start = token.header_b64().len() + 1;
        let claims_json = token.payload_json()?;

        let claim_index = earliest_claim(&claims_json, precompute_keys)?;
        let prefix_len = precompute_len(payload_start, claim_index);

        let remaining = &signed[prefix_len..];
        if remaining.len() > max_signed_data_len {
            return Err(AuraxError::WitnessEncoding(format!(
                "{} signed bytes remain after precompute, limit is {max_signed_data_len}",
                remaining.len()
            )));
        }

        let partial_hash = PartialHashState::precompute(signed, prefix_len)?;
        let partial_data = PayloadBuffer::from_slice(remaining)
            .map_err(|e| AuraxError::WitnessEncoding(e.to_string()))?;
        let base64_decode_offset = decode_offset(payload_start, prefix_len);

        let rsa = RsaLimbs::derive(&key.rsa_modulus()?, &token.signature()?)?;

        tracing::debug!(
            kid = token.key_id(),
            full_len = signed.len(),
            prefix_len,
            partial_len = remaining.len(),
            base64_decode_offset,
            "derived credential witness"
        );

        Ok(Self {
            partial_data,
            partial_hash,
            full_data_length: signed.len(),
            base64_decode_offset,
            rsa,
        })
    }
}

/// Byte index of the earliest `"key":` occurrence across `keys`.
fn earliest_claim(claims_json: &[u8], keys: &[String]) -> Result<usize, AuraxError> {
    let mut earliest: Option<usize> = None;
    for key in keys {
        let needle = format!("\"{key}\":");
        let idx = find(claims_json, needle.as_bytes()).ok_or_else(|| {
            AuraxError::WitnessEncoding(format!("claim {key:?} not present in token payload"))
        })?;
        earliest = Some(earliest.map_or(idx, |e| e.min(idx)));
    }
    earliest.ok_or_else(|| AuraxError::WitnessEncoding("no precompute keys configured".into()))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Length of the block-aligned signed-data prefix hashed outside the circuit.
///
/// The cut is the start of the base64 group holding the claim's first byte,
/// so the claim always survives decoding. The noir-jwt input generator cuts
/// at `floor(index * 4 / 3)`, which can land inside that group; prefix
/// lengths differ from its output when the two cuts straddle a block edge.
fn precompute_len(payload_start: usize, claim_index: usize) -> usize {
    let cut = payload_start + (claim_index / 3) * 4;
    (cut / BLOCK_LEN) * BLOCK_LEN
}

/// Offset of the first complete payload base64 group at or after `prefix_len`,
/// relative to `prefix_len`.
///
/// On a group boundary this is 0. The noir-jwt generator returns 4 there,
/// which skips a whole group and can drop the start of the first claim, so
/// witnesses differ from its output only in that case.
fn decode_offset(payload_start: usize, prefix_len: usize) -> usize {
    if prefix_len <= payload_start {
        payload_start - prefix_len
    } else {
        (4 - (prefix_len - payload_start) % 4) % 4
    }
}

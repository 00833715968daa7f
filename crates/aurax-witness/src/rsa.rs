//! # RSA Signature Limbs
//!
//! The circuit verifies an RS256 signature with Barrett reduction over
//! 2048-bit numbers. It takes the modulus, the reduction parameter
//! `floor(2^(2*2048+4) / n)`, and the signature, each as a [`LimbSet`].

use num_bigint::BigUint;
use num_traits::One;

use aurax_core::AuraxError;

use crate::limbs::LimbSet;

/// RSA modulus width the circuit is built for.
pub const MODULUS_BITS: u64 = 2048;

/// Compute the Barrett reduction parameter for `modulus`.
pub fn reduction_parameter(modulus: &BigUint) -> BigUint {
    (BigUint::one() << (2 * MODULUS_BITS + 4)) / modulus
}

/// Modulus, reduction parameter, and signature as circuit limbs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaLimbs {
    pub modulus: LimbSet,
    pub redc: LimbSet,
    pub signature: LimbSet,
}

impl RsaLimbs {
    /// Zero limbs for all three fields.
    pub fn zero() -> Self {
        Self {
            modulus: LimbSet::zero(),
            redc: LimbSet::zero(),
            signature: LimbSet::zero(),
        }
    }

    /// Derive limbs from big-endian modulus and signature bytes.
    ///
    /// The modulus must be exactly [`MODULUS_BITS`] wide and the signature
    /// must be smaller than the modulus.
    pub fn derive(modulus_be: &[u8], signature_be: &[u8]) -> Result<Self, AuraxError> {
        let modulus = BigUint::from_bytes_be(modulus_be);
        if modulus.bits() != MODULUS_BITS {
            return Err(AuraxError::WitnessEncoding(format!(
                "modulus is {} bits, circuit expects {MODULUS_BITS}",
                modulus.bits()
            )));
        }
        let signature = BigUint::from_bytes_be(signature_be);
        if signature >= modulus {
            return Err(AuraxError::WitnessEncoding(
                "signature is not smaller than the modulus".into(),
            ));
        }
        let redc = reduction_parameter(&modulus);
        Ok(Self {
            modulus: LimbSet::decompose(&modulus)?,
            redc: LimbSet::decompose(&redc)?,
            signature: LimbSet::decompose(&signature)?,
        })
    }
}

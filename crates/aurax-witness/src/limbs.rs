//! # Limb Decomposition
//!
//! The circuit's big-number library represents a 2048-bit value as 18
//! field elements of 120 bits each, least significant limb first. Every
//! limb field (modulus, reduction parameter, signature) has this same
//! shape regardless of the input's actual size.

use num_bigint::BigUint;
use num_traits::{One, Zero};

use aurax_core::AuraxError;

/// Width of one limb in bits.
pub const LIMB_BITS: u64 = 120;

/// Limbs per field.
pub const LIMB_COUNT: usize = 18;

/// A big integer as a fixed-length little-endian limb sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimbSet {
    limbs: Vec<BigUint>,
}

impl LimbSet {
    /// Largest bit length a limb set can represent.
    pub const MAX_BITS: u64 = LIMB_BITS * LIMB_COUNT as u64;

    /// All-zero limbs.
    pub fn zero() -> Self {
        Self {
            limbs: vec![BigUint::zero(); LIMB_COUNT],
        }
    }

    /// Split `value` into [`LIMB_COUNT`] limbs of [`LIMB_BITS`] bits.
    ///
    /// Fails with [`AuraxError::WitnessEncoding`] when `value` needs more
    /// than [`LimbSet::MAX_BITS`] bits.
    pub fn decompose(value: &BigUint) -> Result<Self, AuraxError> {
        if value.bits() > Self::MAX_BITS {
            return Err(AuraxError::WitnessEncoding(format!(
                "value has {} bits, limb capacity is {}",
                value.bits(),
                Self::MAX_BITS
            )));
        }
        let mask = (BigUint::one() << LIMB_BITS) - BigUint::one();
        let mut rest = value.clone();
        let mut limbs = Vec::with_capacity(LIMB_COUNT);
        for _ in 0..LIMB_COUNT {
            limbs.push(&rest & &mask);
            rest >>= LIMB_BITS;
        }
        Ok(Self { limbs })
    }

    /// The limbs, least significant first.
    pub fn limbs(&self) -> &[BigUint] {
        &self.limbs
    }

    /// Rebuild the integer as the base-2^120 weighted sum of the limbs.
    pub fn reconstruct(&self) -> BigUint {
        self.limbs
            .iter()
            .rev()
            .fold(BigUint::zero(), |acc, limb| (acc << LIMB_BITS) + limb)
    }

    /// Decimal rendering of each limb, least significant first.
    pub fn to_decimal_strings(&self) -> Vec<String> {
        self.limbs.iter().map(|l| l.to_str_radix(10)).collect()
    }

    /// Whether every limb is zero.
    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(Zero::is_zero)
    }
}

//! # Bounded Buffers
//!
//! A circuit input schema has no variable-length arrays. Runtime byte
//! strings are therefore carried as a fixed-capacity array plus an explicit
//! logical length, matching the circuit's `BoundedVec { storage, len }`.
//!
//! ## Invariant
//!
//! `len <= N` and every byte at index `>= len` is zero. Construction
//! rejects input longer than the capacity; nothing is ever truncated.

use crate::error::AuraxError;

/// Capacity of the domain buffer.
pub const DOMAIN_CAPACITY: usize = 64;

/// Capacity of the signed-payload buffer fed to the circuit's hash.
pub const PAYLOAD_CAPACITY: usize = 1200;

/// Buffer holding the UTF-8 email domain.
pub type DomainBuffer = BoundedBuffer<DOMAIN_CAPACITY>;

/// Buffer holding the unhashed suffix of the signed token payload.
pub type PayloadBuffer = BoundedBuffer<PAYLOAD_CAPACITY>;

/// Error returned when input exceeds a buffer's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExceeded {
    /// Length of the rejected input.
    pub len: usize,
    /// Capacity of the buffer.
    pub capacity: usize,
}

impl std::fmt::Display for CapacityExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} bytes exceed capacity {}", self.len, self.capacity)
    }
}

impl std::error::Error for CapacityExceeded {}

/// Fixed-capacity byte array with a logical length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundedBuffer<const N: usize> {
    storage: [u8; N],
    len: usize,
}

impl<const N: usize> BoundedBuffer<N> {
    /// An empty buffer: all zeros, length zero.
    pub fn empty() -> Self {
        Self {
            storage: [0u8; N],
            len: 0,
        }
    }

    /// Copy `bytes` into a zero-padded buffer.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CapacityExceeded> {
        if bytes.len() > N {
            return Err(CapacityExceeded {
                len: bytes.len(),
                capacity: N,
            });
        }
        let mut storage = [0u8; N];
        storage[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            storage,
            len: bytes.len(),
        })
    }

    /// The buffer capacity.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// The logical length.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the logical length is zero.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The full zero-padded storage, as the circuit sees it.
    pub fn storage(&self) -> &[u8; N] {
        &self.storage
    }

    /// The logical contents, without padding.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.len]
    }
}

impl<const N: usize> Default for BoundedBuffer<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl DomainBuffer {
    /// Encode a domain string, rejecting anything longer than the
    /// circuit capacity with [`AuraxError::DomainTooLong`].
    pub fn from_domain(domain: &str) -> Result<Self, AuraxError> {
        Self::from_slice(domain.as_bytes()).map_err(|e| AuraxError::DomainTooLong {
            len: e.len,
            capacity: e.capacity,
        })
    }
}

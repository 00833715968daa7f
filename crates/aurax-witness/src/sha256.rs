//! # SHA-256 Partial Precompute
//!
//! Hashing the whole signed token inside the circuit is the most expensive
//! part of the proof. The prefix that precedes the claims of interest is
//! hashed here instead, and the circuit resumes from the resulting
//! compression state over the remaining bytes.
//!
//! ## Invariant
//!
//! For any `data` and 64-byte-aligned `prefix_len <= data.len()`:
//! `PartialHashState::precompute(data, prefix_len)?.finish(&data[prefix_len..])`
//! equals `SHA-256(data)`.

use sha2::digest::consts::U64;
use sha2::digest::generic_array::GenericArray;

use aurax_core::AuraxError;

/// SHA-256 block length in bytes.
pub const BLOCK_LEN: usize = 64;

const INITIAL_STATE: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

type Block = GenericArray<u8, U64>;

fn compress(state: &mut [u32; 8], data: &[u8]) {
    let blocks: Vec<Block> = data
        .chunks_exact(BLOCK_LEN)
        .map(Block::clone_from_slice)
        .collect();
    sha2::compress256(state, &blocks);
}

/// SHA-256 compression state after a block-aligned prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialHashState {
    state: [u32; 8],
    consumed: usize,
}

impl PartialHashState {
    /// State before any input.
    pub fn initial() -> Self {
        Self {
            state: INITIAL_STATE,
            consumed: 0,
        }
    }

    /// All-zero state words, the placeholder domain-only proofs carry.
    pub fn zeroed() -> Self {
        Self {
            state: [0; 8],
            consumed: 0,
        }
    }

    /// Hash the first `prefix_len` bytes of `data`.
    ///
    /// `prefix_len` must be a multiple of [`BLOCK_LEN`] and no greater than
    /// `data.len()`.
    pub fn precompute(data: &[u8], prefix_len: usize) -> Result<Self, AuraxError> {
        if prefix_len % BLOCK_LEN != 0 {
            return Err(AuraxError::WitnessEncoding(format!(
                "hash prefix length {prefix_len} is not a multiple of {BLOCK_LEN}"
            )));
        }
        if prefix_len > data.len() {
            return Err(AuraxError::WitnessEncoding(format!(
                "hash prefix length {prefix_len} exceeds data length {}",
                data.len()
            )));
        }
        let mut state = INITIAL_STATE;
        compress(&mut state, &data[..prefix_len]);
        Ok(Self {
            state,
            consumed: prefix_len,
        })
    }

    /// The eight 32-bit state words, as the circuit's `partial_hash`.
    pub fn words(&self) -> &[u32; 8] {
        &self.state
    }

    /// Number of bytes already absorbed.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Resume over `remaining`, apply padding for the total length, and
    /// return the digest.
    pub fn finish(&self, remaining: &[u8]) -> [u8; 32] {
        let total_bits = ((self.consumed + remaining.len()) as u64).wrapping_mul(8);
        let mut tail = remaining.to_vec();
        tail.push(0x80);
        while tail.len() % BLOCK_LEN != BLOCK_LEN - 8 {
            tail.push(0);
        }
        tail.extend_from_slice(&total_bits.to_be_bytes());

        let mut state = self.state;
        compress(&mut state, &tail);

        let mut out = [0u8; 32];
        for (chunk, word) in out.chunks_exact_mut(4).zip(state.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }
}

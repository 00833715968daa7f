//! # aurax-witness — Circuit Witness Compiler
//!
//! Turns a validated email address, and optionally a provider-signed token
//! with its resolved key, into the exact numeric inputs the expert-gate
//! circuit consumes, then renders them as the toolchain's `Prover.toml`.
//!
//! ## Architecture
//!
//! - **Limbs** (`limbs.rs`): 2048-bit values split into 18 little-endian
//!   limbs of 120 bits, the circuit's big-number word layout.
//! - **RSA** (`rsa.rs`): modulus, reduction parameter, and signature limbs.
//! - **SHA-256** (`sha256.rs`): compression state after a 64-byte-aligned
//!   prefix of the signed data, so the circuit only hashes the suffix.
//! - **JWT** (`jwt.rs`): the full derivation for one token and key.
//! - **Document** (`document.rs`): [`WitnessDocument`], always full-shape;
//!   domain-only documents reuse one shared neutral JWT witness.
//! - **Compiler** (`compiler.rs`): the entry point, [`WitnessCompiler`].
//! - **Serializer** (`serializer.rs`): byte-reproducible `Prover.toml`.
//!
//! ## Determinism
//!
//! Every function here is pure: the same token, key, and email always
//! produce byte-identical output. Any drift between these encodings and the
//! circuit's own re-derivation makes proof verification fail.

pub mod compiler;
pub mod document;
pub mod jwt;
pub mod limbs;
pub mod rsa;
pub mod serializer;
pub mod sha256;

pub use compiler::{WitnessCompiler, WitnessParams};
pub use document::WitnessDocument;
pub use jwt::JwtWitness;
pub use limbs::{LimbSet, LIMB_BITS, LIMB_COUNT};
pub use rsa::{RsaLimbs, MODULUS_BITS};
pub use serializer::{render_prover_toml, write_prover_toml};
pub use sha256::PartialHashState;

//! # aurax-zkp — Proof Orchestration
//!
//! Drives the external zero-knowledge toolchain for the expert gate and
//! ties the whole verification flow together.
//!
//! ## Architecture
//!
//! - **Capabilities** (`traits.rs`): `Compiler`, `Prover`, `KeyGenerator`,
//!   `Verifier`. Synchronous, object-safe, `Send + Sync`.
//! - **Backends**: [`NargoToolchain`] shells out to `nargo` and `bb` with a
//!   per-invocation timeout; [`MockToolchain`] (feature `mock`, on by
//!   default) is deterministic and transparent.
//! - **Cache** (`cache.rs`): program and verification key keyed by a
//!   content fingerprint of the circuit source, behind [`CacheStore`].
//! - **Orchestrator** (`orchestrator.rs`): compile, prove, key-generate,
//!   verify; the first and third are cached.
//! - **Workspace** (`workspace.rs`): a private directory per request.
//! - **Pipeline** (`pipeline.rs`): [`VerificationPipeline`], from request to
//!   authorization decision.
//!
//! ## Crate Policy
//!
//! - Blocking tool calls never run on an async worker thread; the pipeline
//!   moves them to `spawn_blocking`.
//! - No `.unwrap()` outside tests.

pub mod cache;
pub mod config;
#[cfg(feature = "mock")]
pub mod mock;
pub mod nargo;
pub mod orchestrator;
pub mod pipeline;
pub mod process;
pub mod traits;
pub mod workspace;

pub use cache::{ArtifactKind, CacheEntry, CacheStore, CircuitFingerprint, FsCacheStore};
pub use config::{ConfigError, PipelineConfig};
#[cfg(feature = "mock")]
pub use mock::MockToolchain;
pub use nargo::NargoToolchain;
pub use orchestrator::{Orchestrator, ProofOutcome, Toolchain};
pub use pipeline::{
    toolchain_for, PreparedWitness, VerificationOutcome, VerificationPipeline, VerificationRequest,
};
pub use traits::{Compiler, KeyGenerator, ProveInputs, Prover, ToolError, Verifier};
pub use workspace::RequestWorkspace;

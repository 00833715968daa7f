//! # aurax-core — Foundational Types for the Aurax Expert Gate
//!
//! The expert gate lets a user prove control of an email domain (and,
//! optionally, possession of a provider-signed identity token for that
//! address) without handing the token itself to the application. This
//! crate holds the primitives every other crate shares; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One error taxonomy.** [`AuraxError`] enumerates every way a
//!    verification request can fail. Each variant carries a stable
//!    machine-readable code so the HTTP and CLI layers agree.
//!
//! 2. **Fixed-shape buffers.** [`BoundedBuffer`] gives variable-length
//!    runtime data the fixed capacity a circuit input schema requires. The
//!    constructor rejects overflow instead of truncating.
//!
//! 3. **Validated email newtype.** [`EmailAddress`] guarantees exactly one
//!    `@` with non-empty local part and domain, so domain extraction can
//!    never panic or silently yield an empty string.
//!
//! 4. **Explicit mode.** [`VerificationMode`] is always supplied by the
//!    caller; the pipeline never infers it from which fields are present.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `aurax-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod authorization;
pub mod bounded;
pub mod email;
pub mod error;
pub mod mode;

// Re-export primary types for ergonomic imports.
pub use authorization::{AuthorizationDecision, ExpertPolicy};
pub use bounded::{BoundedBuffer, DomainBuffer, PayloadBuffer, DOMAIN_CAPACITY, PAYLOAD_CAPACITY};
pub use email::EmailAddress;
pub use error::{AuraxError, PipelineStage};
pub use mode::VerificationMode;

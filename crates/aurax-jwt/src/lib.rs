//! # aurax-jwt — Identity Tokens and Provider Keys
//!
//! Parses the identity provider's compact signed token and resolves the
//! provider's current RSA signing key.
//!
//! ## Trust Model
//!
//! [`SignedToken::parse`] decodes the header and claims **without checking
//! the signature**. Nothing in this crate establishes that a token is
//! genuine. Authenticity is established only when the proof built from the
//! token and the resolved key verifies: the circuit checks the RSA
//! signature over the signed payload. Gating any decision on the output of
//! this crate alone would accept forged tokens.
//!
//! ## Key Resolution
//!
//! [`JwksResolver`] fetches the provider's JWKS document, caches it for the
//! lifetime stated in `Cache-Control: max-age`, and treats an identifier
//! miss against a cached set as a signal to refresh once before reporting
//! `KeyNotFound`. [`StaticKeyResolver`] serves a fixed key set for offline
//! use and tests.

pub mod config;
pub mod jwks;
pub mod resolver;
pub mod token;

pub use config::JwksConfig;
pub use jwks::{Jwk, JwkSet};
pub use resolver::{JwksResolver, KeyResolver, StaticKeyResolver};
pub use token::{decode_base64url, EmailVerified, SignedToken, TokenClaims, TokenHeader};

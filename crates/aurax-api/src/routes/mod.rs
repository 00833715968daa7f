//! # API Route Modules
//!
//! - `expert` — proof-backed expert verification.

pub mod expert;

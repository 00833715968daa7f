//! # Fingerprint Subcommand
//!
//! Prints the content fingerprint of the circuit package, the key under
//! which its compiled program and verification key are cached.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use aurax_zkp::CircuitFingerprint;

/// Arguments for the `aurax fingerprint` subcommand.
#[derive(Args, Debug)]
pub struct FingerprintArgs {
    /// Circuit package directory; defaults to the configured one.
    #[arg(long, value_name = "DIR")]
    pub circuit_dir: Option<PathBuf>,
}

/// Execute the fingerprint subcommand.
pub fn run_fingerprint(args: &FingerprintArgs, config_path: Option<&Path>) -> Result<u8> {
    let circuit_dir = match &args.circuit_dir {
        Some(dir) => dir.clone(),
        None => crate::load_config(config_path)?.circuit_dir,
    };
    let fingerprint = CircuitFingerprint::compute(&circuit_dir)
        .with_context(|| format!("failed to fingerprint circuit: {}", circuit_dir.display()))?;
    println!("{fingerprint}");
    Ok(0)
}

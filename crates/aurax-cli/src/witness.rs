//! # Witness Subcommand
//!
//! Compiles one request into the circuit's `Prover.toml` input file
//! without running the proof toolchain. Useful for driving `nargo`
//! by hand or diffing witnesses across releases.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use aurax_witness::write_prover_toml;
use aurax_zkp::VerificationPipeline;

use crate::RequestArgs;

/// Arguments for the `aurax witness` subcommand.
#[derive(Args, Debug)]
pub struct WitnessArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Output path for the witness file.
    #[arg(long, short, default_value = "Prover.toml")]
    pub out: PathBuf,
}

/// Execute the witness subcommand.
pub fn run_witness(args: &WitnessArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = crate::load_config(config_path)?;
    let request = args.request.to_request()?;
    let resolver = crate::key_resolver(args.request.jwks.as_deref())?;
    let pipeline = VerificationPipeline::from_config(&config, resolver);

    let prepared = crate::runtime()?.block_on(pipeline.prepare(&request))?;
    write_prover_toml(&prepared.document, &args.out)
        .with_context(|| format!("failed to write witness: {}", args.out.display()))?;

    println!(
        "OK: wrote witness mode={} domain={} path={}",
        prepared.document.mode(),
        prepared.email.domain(),
        args.out.display()
    );
    Ok(0)
}

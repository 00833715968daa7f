//! # aurax CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use aurax_cli::cache::{run_cache, CacheArgs};
use aurax_cli::fingerprint::{run_fingerprint, FingerprintArgs};
use aurax_cli::verify::{run_verify, VerifyArgs};
use aurax_cli::witness::{run_witness, WitnessArgs};

/// Aurax expert gate
///
/// Compiles email and provider credentials into circuit witnesses, drives
/// the proof toolchain, and maintains the artifact cache.
#[derive(Parser, Debug)]
#[command(name = "aurax", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the pipeline configuration file (TOML).
    #[arg(long, global = true, env = "AURAX_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a request into a Prover.toml witness file.
    Witness(WitnessArgs),

    /// Run one verification and print the decision as JSON.
    Verify(VerifyArgs),

    /// Print the circuit's content fingerprint.
    Fingerprint(FingerprintArgs),

    /// Inspect or clear the artifact cache.
    Cache(CacheArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Witness(args) => run_witness(args, config),
        Commands::Verify(args) => run_verify(args, config),
        Commands::Fingerprint(args) => run_fingerprint(args, config),
        Commands::Cache(args) => run_cache(args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

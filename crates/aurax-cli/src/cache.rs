//! # Cache Subcommand
//!
//! Inspects and empties the fingerprint-keyed artifact cache under
//! `{work_dir}/cache`.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use aurax_zkp::{CacheStore, CircuitFingerprint, FsCacheStore};

/// Arguments for the `aurax cache` subcommand.
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Cache subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// List cached artifacts; `*` marks those built from the current circuit.
    Status,
    /// Remove every cached artifact.
    Clear,
}

/// Execute the cache subcommand.
pub fn run_cache(args: &CacheArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = crate::load_config(config_path)?;
    let store = FsCacheStore::new(config.cache_dir());

    match args.command {
        CacheCommand::Status => {
            // A missing circuit still lets the listing through.
            let current = CircuitFingerprint::compute(&config.circuit_dir).ok();
            cmd_status(&store, current.as_ref())
        }
        CacheCommand::Clear => cmd_clear(&store),
    }
}

fn cmd_status(store: &FsCacheStore, current: Option<&CircuitFingerprint>) -> Result<u8> {
    let entries = store
        .entries()
        .with_context(|| format!("failed to read cache: {}", store.root().display()))?;
    if entries.is_empty() {
        println!("cache empty: {}", store.root().display());
        return Ok(0);
    }
    for entry in &entries {
        let marker = if Some(&entry.fingerprint) == current { "*" } else { " " };
        println!(
            "{marker} {:<7} {}  {} bytes",
            entry.kind.as_str(),
            entry.fingerprint,
            entry.size
        );
    }
    println!("{} artifact(s)", entries.len());
    Ok(0)
}

fn cmd_clear(store: &FsCacheStore) -> Result<u8> {
    let removed = store
        .clear()
        .with_context(|| format!("failed to clear cache: {}", store.root().display()))?;
    tracing::info!(removed, "cache cleared");
    println!("OK: removed {removed} artifact(s)");
    Ok(0)
}

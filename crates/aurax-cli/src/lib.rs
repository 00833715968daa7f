//! # aurax-cli — Command-Line Tool for the Expert Gate
//!
//! Provides the `aurax` command-line interface over the same pipeline the
//! HTTP service runs.
//!
//! ## Subcommands
//!
//! - `aurax witness` — compile a request into a `Prover.toml` witness file.
//! - `aurax verify` — run one verification and print the decision as JSON.
//! - `aurax fingerprint` — print the circuit's content fingerprint.
//! - `aurax cache status|clear` — inspect or empty the artifact cache.
//!
//! ```bash
//! aurax witness --email ada@gmail.com --mode domain --out Prover.toml
//! aurax verify --email ada@gmail.com --mode credential \
//!     --token-file id_token.txt --jwks certs.json
//! aurax --config aurax.toml cache status
//! ```
//!
//! Handlers return an exit code: 0 on success, 1 when a verification or
//! check comes back negative. Operational errors surface as `Err` and the
//! binary exits with 2.

pub mod cache;
pub mod fingerprint;
pub mod verify;
pub mod witness;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use aurax_core::VerificationMode;
use aurax_jwt::{JwksConfig, JwksResolver, KeyResolver, StaticKeyResolver};
use aurax_zkp::{PipelineConfig, VerificationRequest};

/// Load pipeline configuration from `path` (if any) plus `AURAX_*`
/// overrides.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    PipelineConfig::load(path).context("failed to load pipeline configuration")
}

/// Key resolver for credential mode: a local JWKS file when given,
/// otherwise the provider endpoint from `AURAX_JWKS_*`.
pub fn key_resolver(jwks_file: Option<&Path>) -> Result<Arc<dyn KeyResolver>> {
    match jwks_file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read key set: {}", path.display()))?;
            let resolver = StaticKeyResolver::from_json(&json)
                .with_context(|| format!("invalid key set: {}", path.display()))?;
            Ok(Arc::new(resolver))
        }
        None => {
            let config = JwksConfig::from_env().context("invalid key endpoint")?;
            tracing::debug!(url = %config.url, "using provider key endpoint");
            Ok(Arc::new(JwksResolver::new(config)?))
        }
    }
}

/// Request fields shared by `witness` and `verify`.
#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// Email address whose domain is proven.
    #[arg(long)]
    pub email: String,

    /// Verification mode: `domain` or `credential`.
    #[arg(long)]
    pub mode: VerificationMode,

    /// Compact signed token (credential mode).
    #[arg(long, conflicts_with = "token_file")]
    pub token: Option<String>,

    /// File holding the compact signed token (credential mode).
    #[arg(long, value_name = "FILE")]
    pub token_file: Option<PathBuf>,

    /// Resolve provider keys from a local JWKS file instead of the network.
    #[arg(long, value_name = "FILE")]
    pub jwks: Option<PathBuf>,
}

impl RequestArgs {
    /// Build the pipeline request, reading the token file if one was given.
    pub fn to_request(&self) -> Result<VerificationRequest> {
        let signed_token = match (&self.token, &self.token_file) {
            (Some(token), _) => Some(token.trim().to_string()),
            (None, Some(path)) => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read token: {}", path.display()))?
                    .trim()
                    .to_string(),
            ),
            (None, None) => None,
        };
        if self.mode.requires_token() && signed_token.is_none() {
            bail!("--mode credential requires --token or --token-file");
        }
        Ok(VerificationRequest {
            email: self.email.clone(),
            mode: self.mode,
            signed_token,
        })
    }
}

/// Single-purpose runtime for one async pipeline call.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

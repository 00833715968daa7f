//! # Verify Subcommand
//!
//! Runs one verification through the full pipeline and prints the
//! outcome as JSON on stdout. Exits 0 when the proof verified, 1 when the
//! verifier rejected it.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use aurax_zkp::VerificationPipeline;

use crate::RequestArgs;

/// Arguments for the `aurax verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Use the in-process mock toolchain (no zero-knowledge guarantees).
    #[arg(long)]
    pub mock: bool,
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs, config_path: Option<&Path>) -> Result<u8> {
    let mut config = crate::load_config(config_path)?;
    config.mock_toolchain |= args.mock;
    let request = args.request.to_request()?;
    let resolver = crate::key_resolver(args.request.jwks.as_deref())?;
    let pipeline = VerificationPipeline::from_config(&config, resolver);

    let outcome = crate::runtime()?.block_on(pipeline.verify(&request))?;
    let json = serde_json::to_string_pretty(&outcome).context("failed to render outcome")?;
    println!("{json}");

    Ok(if outcome.verified { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Fixture;
    use aurax_core::VerificationMode;

    fn args(email: &str, mode: VerificationMode, mock: bool) -> VerifyArgs {
        VerifyArgs {
            request: RequestArgs {
                email: email.into(),
                mode,
                token: None,
                token_file: None,
                jwks: None,
            },
            mock,
        }
    }

    #[test]
    fn domain_verification_with_mock_toolchain() {
        let fx = Fixture::new(false);
        let code = run_verify(
            &args("ada@gmail.com", VerificationMode::Domain, true),
            Some(&fx.config()),
        )
        .unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn invalid_email_is_an_error() {
        let fx = Fixture::new(true);
        let err = run_verify(
            &args("not-an-address", VerificationMode::Domain, false),
            Some(&fx.config()),
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid email"));
    }
}

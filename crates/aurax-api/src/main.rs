//! # aurax-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Binds to `PORT` (default 8080).
//! Pipeline settings come from the TOML file named by `AURAX_CONFIG`
//! (optional) and `AURAX_*` overrides; the key endpoint from
//! `AURAX_JWKS_*`.

use std::path::PathBuf;
use std::sync::Arc;

use aurax_api::state::AppState;
use aurax_jwt::{JwksConfig, JwksResolver};
use aurax_zkp::{PipelineConfig, VerificationPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let config_path = std::env::var_os("AURAX_CONFIG").map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref()).map_err(|e| {
        tracing::error!("Pipeline configuration failed: {e}");
        e
    })?;

    let jwks = JwksConfig::from_env()?;
    tracing::info!(url = %jwks.url, "provider key set endpoint");
    let resolver = JwksResolver::new(jwks)?;

    tracing::info!(
        circuit_dir = %config.circuit_dir.display(),
        work_dir = %config.work_dir.display(),
        mock = config.mock_toolchain,
        "pipeline configured"
    );
    let pipeline = VerificationPipeline::from_config(&config, Arc::new(resolver));
    let app = aurax_api::app(AppState::new(pipeline));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Aurax API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

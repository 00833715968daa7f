//! # Application State
//!
//! Shared state handed to every handler. The pipeline owns the key
//! resolver, the witness compiler, and the proof orchestrator, and is
//! safe to share across concurrent requests.

use std::sync::Arc;

use aurax_zkp::VerificationPipeline;

use crate::middleware::metrics::GateMetrics;

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: Arc<VerificationPipeline>,
    pub metrics: Arc<GateMetrics>,
}

impl AppState {
    pub fn new(pipeline: VerificationPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            metrics: Arc::new(GateMetrics::default()),
        }
    }
}

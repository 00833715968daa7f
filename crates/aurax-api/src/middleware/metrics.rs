//! # Gate Metrics
//!
//! In-process counters kept in [`AppState`] and served as JSON at
//! `GET /metrics`. [`track_requests`] counts HTTP outcomes on the API
//! router; the verification handler records each proof decision.

use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Counters shared by every request.
#[derive(Debug, Default)]
pub struct GateMetrics {
    requests: AtomicU64,
    client_errors: AtomicU64,
    server_errors: AtomicU64,
    verified: AtomicU64,
    rejected: AtomicU64,
    privileged: AtomicU64,
}

/// Point-in-time copy of [`GateMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub client_errors: u64,
    pub server_errors: u64,
    /// Proofs the verifier accepted.
    pub verified: u64,
    /// Proofs the verifier rejected.
    pub rejected: u64,
    /// Accepted proofs that granted expert status.
    pub privileged: u64,
}

impl GateMetrics {
    pub fn record_status(&self, status: StatusCode) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if status.is_client_error() {
            self.client_errors.fetch_add(1, Ordering::Relaxed);
        } else if status.is_server_error() {
            self.server_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_decision(&self, verified: bool, privileged: bool) {
        if !verified {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.verified.fetch_add(1, Ordering::Relaxed);
        if privileged {
            self.privileged.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            client_errors: self.client_errors.load(Ordering::Relaxed),
            server_errors: self.server_errors.load(Ordering::Relaxed),
            verified: self.verified.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            privileged: self.privileged.load(Ordering::Relaxed),
        }
    }
}

/// Count every response that passes through the API router.
pub async fn track_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    state.metrics.record_status(response.status());
    response
}

/// GET /metrics — Current counter values.
#[utoipa::path(
    get,
    path = "/metrics",
    responses((status = 200, description = "Counter snapshot", body = MetricsSnapshot)),
    tag = "operations"
)]
pub(crate) async fn metrics_snapshot(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

//! # aurax-api — HTTP Surface for the Expert Gate
//!
//! | Route                     | Module               |
//! |---------------------------|----------------------|
//! | `POST /v1/expert/verify`  | [`routes::expert`]   |
//! | `GET /openapi.json`       | [`openapi`]          |
//! | `GET /health/liveness`    | this module          |
//! | `GET /health/readiness`   | this module          |
//! | `GET /metrics`            | [`middleware::metrics`] |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → track_requests → Handler
//! ```
//!
//! Health probes and `/metrics` sit outside both layers, so scrapes do not
//! count as requests.

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::expert::router())
        .merge(openapi::router())
        .layer(from_fn_with_state(
            state.clone(),
            middleware::metrics::track_requests,
        ))
        .layer(TraceLayer::new_for_http());

    let operations = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .route("/metrics", get(middleware::metrics::metrics_snapshot));

    Router::new().merge(operations).merge(api).with_state(state)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}

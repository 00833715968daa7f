//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented routes into a single spec served at
//! `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aurax Expert Gate API",
        version = "0.1.0",
        description = "Zero-knowledge proof of email domain control and provider-signed credentials, mapped to expert status.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::expert::verify_expert,
        crate::middleware::metrics::metrics_snapshot,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::expert::VerifyExpertRequest,
        crate::routes::expert::VerifyExpertResponse,
        crate::middleware::metrics::MetricsSnapshot,
    )),
    tags(
        (name = "expert", description = "Expert verification"),
        (name = "operations", description = "Service counters"),
    )
)]
pub struct ApiDoc;

/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

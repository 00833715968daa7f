//! # Integration Tests for aurax-api
//!
//! Drives the router with `oneshot` against the mock toolchain and a
//! static provider key set: health probes, the OpenAPI document, and the
//! verification endpoint's decisions and error bodies.

#![cfg(feature = "mock")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use aurax_api::state::AppState;
use aurax_jwt::{Jwk, JwkSet, StaticKeyResolver};
use aurax_zkp::{MockToolchain, PipelineConfig, Toolchain, VerificationPipeline};

const KID: &str = "provider-key-1";

struct TestApp {
    _root: tempfile::TempDir,
    mock: Arc<MockToolchain>,
    router: axum::Router,
}

/// Helper: build the app over a throwaway circuit and work directory.
fn test_app() -> TestApp {
    let root = tempfile::tempdir().unwrap();
    let circuit = root.path().join("circuit");
    std::fs::create_dir_all(circuit.join("src")).unwrap();
    std::fs::write(circuit.join("Nargo.toml"), "[package]\nname = \"expert_gate\"\n").unwrap();
    std::fs::write(circuit.join("src/main.nr"), "fn main() {}").unwrap();

    let config = PipelineConfig {
        circuit_dir: circuit,
        work_dir: root.path().join("work"),
        ..PipelineConfig::default()
    };

    let mut n = vec![0xc3u8; 256];
    n[255] |= 1;
    let key = Jwk {
        kid: KID.into(),
        kty: "RSA".into(),
        alg: Some("RS256".into()),
        key_use: Some("sig".into()),
        n: Some(URL_SAFE_NO_PAD.encode(n)),
        e: Some("AQAB".into()),
    };
    let resolver = Arc::new(StaticKeyResolver::new(JwkSet { keys: vec![key] }));
    let mock = Arc::new(MockToolchain::new());
    let pipeline =
        VerificationPipeline::new(&config, resolver, Toolchain::from_backend(mock.clone()));

    TestApp {
        _root: root,
        mock,
        router: aurax_api::app(AppState::new(pipeline)),
    }
}

fn token(kid: &str, email: &str) -> String {
    let header = json!({ "alg": "RS256", "kid": kid, "typ": "JWT" });
    let claims = json!({
        "iss": "https://accounts.google.com",
        "sub": "1234567890",
        "email": email,
        "email_verified": true,
        "exp": 1_900_000_000
    });
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode([0x5au8; 256]),
    )
}

async fn post_verify(app: &TestApp, body: String) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/expert/verify")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_text(app: &TestApp, uri: &str) -> (StatusCode, String) {
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let app = test_app();
    let (status, body) = get_text(&app, "/health/liveness").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let app = test_app();
    let (status, body) = get_text(&app, "/health/readiness").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ready");
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_document_served() {
    let app = test_app();
    let (status, body) = get_text(&app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    let spec: Value = serde_json::from_str(&body).unwrap();
    assert!(spec["paths"]["/v1/expert/verify"]["post"].is_object());
    assert!(spec["paths"]["/metrics"]["get"].is_object());
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_count_requests_and_decisions() {
    let app = test_app();
    post_verify(
        &app,
        json!({ "email": "ada@example.com", "mode": "domain" }).to_string(),
    )
    .await;
    post_verify(&app, json!({ "email": "nobody", "mode": "domain" }).to_string()).await;
    get_text(&app, "/health/liveness").await;

    let (status, body) = get_text(&app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    let counters: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(counters["requests"], 2);
    assert_eq!(counters["client_errors"], 1);
    assert_eq!(counters["server_errors"], 0);
    assert_eq!(counters["verified"], 1);
    assert_eq!(counters["privileged"], 0);
    assert_eq!(counters["rejected"], 0);
}

// -- Verification decisions ---------------------------------------------------

#[tokio::test]
async fn test_domain_mode_verified_but_not_privileged() {
    let app = test_app();
    let (status, body) = post_verify(
        &app,
        json!({ "email": "ada@example.com", "mode": "domain" }).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);
    assert_eq!(body["privileged"], false);
    assert_eq!(body["domain"], "example.com");
    assert_eq!(body["mode"], "domain");
    assert_eq!(body["circuit_fingerprint"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_credential_mode_expert_subdomain_privileged() {
    let app = test_app();
    let email = "ada@staff.gmail.com";
    let (status, body) = post_verify(
        &app,
        json!({ "email": email, "mode": "credential", "signed_token": token(KID, email) })
            .to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);
    assert_eq!(body["privileged"], true);
    assert_eq!(body["message"], "expert status granted");
}

#[tokio::test]
async fn test_rejected_proof_not_privileged() {
    let app = test_app();
    app.mock.set_reject(true);
    let email = "ada@gmail.com";
    let (status, body) = post_verify(
        &app,
        json!({ "email": email, "mode": "credential", "signed_token": token(KID, email) })
            .to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], false);
    assert_eq!(body["privileged"], false);
}

// -- Error bodies -------------------------------------------------------------

#[tokio::test]
async fn test_two_part_token_is_malformed() {
    let app = test_app();
    let (status, body) = post_verify(
        &app,
        json!({
            "email": "ada@gmail.com",
            "mode": "credential",
            "signed_token": "eyJhbGciOiJSUzI1NiJ9.eyJlbWFpbCI6ImEifQ"
        })
        .to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["verified"], false);
    assert_eq!(body["privileged"], false);
    assert_eq!(body["error"]["code"], "MALFORMED_TOKEN");
    assert_eq!(app.mock.proves(), 0);
}

#[tokio::test]
async fn test_unknown_key_is_422_and_never_compiles() {
    let app = test_app();
    let email = "ada@gmail.com";
    let (status, body) = post_verify(
        &app,
        json!({ "email": email, "mode": "credential", "signed_token": token("gone", email) })
            .to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "KEY_NOT_FOUND");
    assert_eq!(body["error"]["details"]["kid"], "gone");
    assert_eq!(app.mock.compiles(), 0);
}

#[tokio::test]
async fn test_long_domain_is_422() {
    let app = test_app();
    let email = format!("a@{}.com", "d".repeat(70));
    let (status, body) =
        post_verify(&app, json!({ "email": email, "mode": "domain" }).to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "DOMAIN_TOO_LONG");
    assert_eq!(body["error"]["details"]["capacity"], 64);
}

#[tokio::test]
async fn test_invalid_email_is_400() {
    let app = test_app();
    let (status, body) =
        post_verify(&app, json!({ "email": "nobody", "mode": "domain" }).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_EMAIL");
}

#[tokio::test]
async fn test_missing_mode_is_bad_request() {
    let app = test_app();
    let (status, body) =
        post_verify(&app, json!({ "email": "ada@gmail.com" }).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["verified"], false);
}

#[tokio::test]
async fn test_toolchain_failure_names_stage() {
    let app = test_app();
    app.mock.fail_at(Some(aurax_core::PipelineStage::Prove));
    let (status, body) = post_verify(
        &app,
        json!({ "email": "ada@gmail.com", "mode": "domain" }).to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PROOF_PIPELINE_FAILED");
    assert_eq!(body["error"]["details"]["stage"], "prove");
}

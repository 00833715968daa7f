//! # Verification Pipeline
//!
//! One request, end to end: validate the email, parse the token and resolve
//! its key (credential mode only), compile and write the witness, run the
//! toolchain, then apply the expert policy.
//!
//! Every step fails fast. A malformed token fails before any file is
//! written; a missing provider key fails before the toolchain is touched.
//!
//! The token's signature is never checked here. Only a proof that the
//! verifier accepts establishes that the token is genuine.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use aurax_core::{AuraxError, EmailAddress, ExpertPolicy, VerificationMode};
use aurax_jwt::{KeyResolver, SignedToken};
use aurax_witness::{write_prover_toml, WitnessCompiler, WitnessDocument};

use crate::cache::FsCacheStore;
use crate::config::PipelineConfig;
use crate::nargo::NargoToolchain;
use crate::orchestrator::{Orchestrator, Toolchain};
use crate::workspace::RequestWorkspace;

/// Caller input for one verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub email: String,
    pub mode: VerificationMode,
    /// Compact provider token; required in credential mode, ignored in
    /// domain mode.
    pub signed_token: Option<String>,
}

/// Result of a completed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationOutcome {
    pub request_id: Uuid,
    pub verified: bool,
    pub privileged: bool,
    pub domain: String,
    pub mode: VerificationMode,
    /// Circuit fingerprint the proof was checked against.
    pub fingerprint: String,
    pub completed_at: DateTime<Utc>,
}

/// A compiled witness, before the toolchain runs.
#[derive(Debug, Clone)]
pub struct PreparedWitness {
    pub email: EmailAddress,
    pub document: WitnessDocument,
}

/// Select the toolchain named by `config`.
pub fn toolchain_for(config: &PipelineConfig) -> Toolchain {
    if let Some(mock) = mock_toolchain(config) {
        return mock;
    }
    Toolchain::from_backend(Arc::new(NargoToolchain::new(
        &config.nargo_bin,
        &config.bb_bin,
        config.tool_timeout(),
    )))
}

#[cfg(feature = "mock")]
fn mock_toolchain(config: &PipelineConfig) -> Option<Toolchain> {
    config.mock_toolchain.then(|| {
        tracing::warn!("using mock toolchain; proofs carry no zero-knowledge guarantees");
        Toolchain::from_backend(Arc::new(crate::mock::MockToolchain::new()))
    })
}

#[cfg(not(feature = "mock"))]
fn mock_toolchain(config: &PipelineConfig) -> Option<Toolchain> {
    if config.mock_toolchain {
        tracing::warn!("mock toolchain requested but the `mock` feature is disabled");
    }
    None
}

/// The end-to-end verification service.
pub struct VerificationPipeline {
    compiler: WitnessCompiler,
    resolver: Arc<dyn KeyResolver>,
    orchestrator: Arc<Orchestrator>,
    policy: ExpertPolicy,
    work_dir: PathBuf,
}

impl std::fmt::Debug for VerificationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationPipeline")
            .field("orchestrator", &self.orchestrator)
            .field("policy", &self.policy)
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}

impl VerificationPipeline {
    /// Assemble a pipeline with an explicit toolchain.
    pub fn new(
        config: &PipelineConfig,
        resolver: Arc<dyn KeyResolver>,
        toolchain: Toolchain,
    ) -> Self {
        let cache = Arc::new(FsCacheStore::new(config.cache_dir()));
        Self {
            compiler: WitnessCompiler::new(config.witness_params()),
            resolver,
            orchestrator: Arc::new(Orchestrator::new(toolchain, cache, &config.circuit_dir)),
            policy: ExpertPolicy::new(&config.expert_domains),
            work_dir: config.work_dir.clone(),
        }
    }

    /// Assemble a pipeline with the toolchain `config` selects.
    pub fn from_config(config: &PipelineConfig, resolver: Arc<dyn KeyResolver>) -> Self {
        Self::new(config, resolver, toolchain_for(config))
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    pub fn policy(&self) -> &ExpertPolicy {
        &self.policy
    }

    /// Validate the request and compile its witness without writing
    /// anything or running the toolchain.
    pub async fn prepare(&self, req: &VerificationRequest) -> Result<PreparedWitness, AuraxError> {
        let email = EmailAddress::parse(&req.email)?;

        let (email, document) = match req.mode {
            VerificationMode::Domain => {
                if req.signed_token.is_some() {
                    tracing::debug!(domain = email.domain(), "domain mode ignores the signed token");
                }
                let document = self.compiler.compile_domain(&email)?;
                (email, document)
            }
            VerificationMode::Credential => {
                let raw = req
                    .signed_token
                    .as_deref()
                    .filter(|t| !t.trim().is_empty())
                    .ok_or_else(|| {
                        AuraxError::MalformedToken("credential mode requires a signed token".into())
                    })?;
                let token = SignedToken::parse(raw)?;
                let claims = token.claims()?;
                // The circuit compares the domain against the signed payload
                // byte for byte, so the witness uses the token's spelling.
                let bound = match claims.email.as_deref() {
                    Some(claimed) if email.matches(claimed) => EmailAddress::parse(claimed)
                        .map_err(|e| AuraxError::MalformedToken(format!("token email: {e}")))?,
                    Some(_) => {
                        return Err(AuraxError::MalformedToken(
                            "token email does not match the request email".into(),
                        ))
                    }
                    None => email,
                };
                let key = self.resolver.resolve(token.key_id()).await?;
                let document = self.compiler.compile_credential(&bound, &token, &key)?;
                (bound, document)
            }
        };

        Ok(PreparedWitness { email, document })
    }

    /// Run one verification to completion.
    pub async fn verify(
        &self,
        req: &VerificationRequest,
    ) -> Result<VerificationOutcome, AuraxError> {
        let prepared = self.prepare(req).await?;
        let domain = prepared.email.domain().to_string();

        let workspace = RequestWorkspace::create(&self.work_dir)?;
        let request_id = workspace.id();
        tracing::info!(%request_id, mode = %req.mode, domain = %domain, "verification started");
        write_prover_toml(&prepared.document, &workspace.prover_toml())?;

        // The toolchain blocks for seconds to minutes.
        let orchestrator = Arc::clone(&self.orchestrator);
        let proof = tokio::task::spawn_blocking(move || orchestrator.run(&workspace))
            .await
            .map_err(|e| AuraxError::Internal(format!("proof task failed: {e}")))?
            .map_err(|e| {
                tracing::warn!(%request_id, error = %e, "proof pipeline failed");
                e
            })?;

        let decision = self.policy.decide(proof.verified, &domain, req.mode);
        tracing::info!(
            %request_id,
            verified = decision.verified,
            privileged = decision.privileged,
            domain = %domain,
            "verification finished"
        );

        Ok(VerificationOutcome {
            request_id,
            verified: decision.verified,
            privileged: decision.privileged,
            domain,
            mode: req.mode,
            fingerprint: proof.fingerprint.to_string(),
            completed_at: Utc::now(),
        })
    }
}

//! # Toolchain Orchestrator
//!
//! Drives one proof run through four strictly ordered stages:
//!
//! 1. **Compile** (cached by circuit fingerprint)
//! 2. **Prove** (every run, inside the request workspace)
//! 3. **Key-Generate** (cached by circuit fingerprint)
//! 4. **Verify** (every run)
//!
//! A stage failure stops the run with [`AuraxError::ProofPipelineFailed`]
//! naming the stage. Nothing is retried.
//!
//! ## Concurrency
//!
//! Cached builds happen under one in-process lock with a re-check after
//! acquiring it, so concurrent first requests compile once. Per-request
//! stages touch only the request's own workspace.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use aurax_core::{AuraxError, PipelineStage};

use crate::cache::{ArtifactKind, CacheStore, CircuitFingerprint};
use crate::traits::{Compiler, KeyGenerator, ProveInputs, Prover, Verifier};
use crate::workspace::RequestWorkspace;

/// The four toolchain capabilities.
#[derive(Clone)]
pub struct Toolchain {
    pub compiler: Arc<dyn Compiler>,
    pub prover: Arc<dyn Prover>,
    pub key_generator: Arc<dyn KeyGenerator>,
    pub verifier: Arc<dyn Verifier>,
}

impl Toolchain {
    /// Use one backend for every capability.
    pub fn from_backend<T>(backend: Arc<T>) -> Self
    where
        T: Compiler + Prover + KeyGenerator + Verifier + 'static,
    {
        Self {
            compiler: backend.clone(),
            prover: backend.clone(),
            key_generator: backend.clone(),
            verifier: backend,
        }
    }
}

impl std::fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toolchain").finish_non_exhaustive()
    }
}

/// Result of one proof run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOutcome {
    /// Whether the verifier accepted the proof.
    pub verified: bool,
    /// Fingerprint of the circuit the proof was made against.
    pub fingerprint: CircuitFingerprint,
    /// Whether the program came from the cache.
    pub program_cached: bool,
    /// Whether the verification key came from the cache.
    pub vk_cached: bool,
}

/// Runs the compile/prove/key-generate/verify sequence.
pub struct Orchestrator {
    toolchain: Toolchain,
    cache: Arc<dyn CacheStore>,
    circuit_dir: PathBuf,
    build_lock: Mutex<()>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("circuit_dir", &self.circuit_dir)
            .finish_non_exhaustive()
    }
}

fn internal(stage: PipelineStage, what: &str, e: std::io::Error) -> AuraxError {
    AuraxError::ProofPipelineFailed {
        stage,
        detail: format!("{what}: {e}"),
    }
}

impl Orchestrator {
    pub fn new(
        toolchain: Toolchain,
        cache: Arc<dyn CacheStore>,
        circuit_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            toolchain,
            cache,
            circuit_dir: circuit_dir.into(),
            build_lock: Mutex::new(()),
        }
    }

    pub fn circuit_dir(&self) -> &Path {
        &self.circuit_dir
    }

    pub fn cache(&self) -> &dyn CacheStore {
        self.cache.as_ref()
    }

    /// Fingerprint of the current circuit source.
    pub fn fingerprint(&self) -> Result<CircuitFingerprint, AuraxError> {
        CircuitFingerprint::compute(&self.circuit_dir)
            .map_err(|e| internal(PipelineStage::Compile, "fingerprinting circuit source", e))
    }

    /// Return the cached program for `fingerprint`, compiling it first if
    /// absent. The flag is `true` on a cache hit.
    pub fn ensure_program(
        &self,
        fingerprint: &CircuitFingerprint,
        scratch: &Path,
    ) -> Result<(PathBuf, bool), AuraxError> {
        let stage = PipelineStage::Compile;
        self.ensure(ArtifactKind::Program, stage, fingerprint, || {
            let out = scratch.join("program.json");
            self.toolchain
                .compiler
                .compile(&self.circuit_dir, &out)
                .map_err(|e| e.at(stage))?;
            Ok(out)
        })
    }

    /// Return the cached verification key for `fingerprint`, deriving it
    /// from `program` first if absent.
    pub fn ensure_verification_key(
        &self,
        fingerprint: &CircuitFingerprint,
        program: &Path,
        scratch: &Path,
    ) -> Result<(PathBuf, bool), AuraxError> {
        let stage = PipelineStage::KeyGenerate;
        self.ensure(ArtifactKind::VerificationKey, stage, fingerprint, || {
            let out = scratch.join("vk");
            self.toolchain
                .key_generator
                .write_verification_key(program, &out)
                .map_err(|e| e.at(stage))?;
            Ok(out)
        })
    }

    fn ensure(
        &self,
        kind: ArtifactKind,
        stage: PipelineStage,
        fingerprint: &CircuitFingerprint,
        build: impl FnOnce() -> Result<PathBuf, AuraxError>,
    ) -> Result<(PathBuf, bool), AuraxError> {
        let lookup = || {
            self.cache
                .get(kind, fingerprint)
                .map_err(|e| internal(stage, "reading artifact cache", e))
        };

        if let Some(path) = lookup()? {
            tracing::debug!(%kind, fingerprint = fingerprint.short(), "cache hit");
            return Ok((path, true));
        }

        let _guard = self.build_lock.lock();
        if let Some(path) = lookup()? {
            tracing::debug!(%kind, fingerprint = fingerprint.short(), "cache hit after wait");
            return Ok((path, true));
        }

        tracing::info!(%kind, fingerprint = fingerprint.short(), "cache miss; building");
        let built = build()?;
        let stored = self
            .cache
            .put(kind, fingerprint, &built)
            .map_err(|e| internal(stage, "writing artifact cache", e))?;
        Ok((stored, false))
    }

    /// Run all four stages against the witness in `workspace`.
    pub fn run(&self, workspace: &RequestWorkspace) -> Result<ProofOutcome, AuraxError> {
        let request_id = workspace.id();
        let fingerprint = self.fingerprint()?;

        tracing::info!(%request_id, stage = "compile", "stage started");
        let (program, program_cached) = self.ensure_program(&fingerprint, workspace.path())?;

        tracing::info!(%request_id, stage = "prove", "stage started");
        let proof = workspace.proof();
        let prover_toml = workspace.prover_toml();
        self.toolchain
            .prover
            .prove(&ProveInputs {
                circuit_dir: &self.circuit_dir,
                program: &program,
                prover_toml: &prover_toml,
                work_dir: workspace.path(),
                proof_out: &proof,
            })
            .map_err(|e| e.at(PipelineStage::Prove))?;

        tracing::info!(%request_id, stage = "key_generate", "stage started");
        let (vk, vk_cached) =
            self.ensure_verification_key(&fingerprint, &program, workspace.path())?;

        tracing::info!(%request_id, stage = "verify", "stage started");
        let verified = self
            .toolchain
            .verifier
            .verify(&vk, &proof)
            .map_err(|e| e.at(PipelineStage::Verify))?;

        tracing::info!(
            %request_id,
            verified,
            program_cached,
            vk_cached,
            fingerprint = fingerprint.short(),
            "proof run finished"
        );
        Ok(ProofOutcome {
            verified,
            fingerprint,
            program_cached,
            vk_cached,
        })
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::cache::FsCacheStore;
    use crate::mock::MockToolchain;
    use std::fs;

    struct Fixture {
        root: tempfile::TempDir,
        mock: Arc<MockToolchain>,
        orchestrator: Orchestrator,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let circuit = root.path().join("circuit");
            fs::create_dir_all(circuit.join("src")).unwrap();
            fs::write(circuit.join("Nargo.toml"), "[package]\nname = \"gate\"\n").unwrap();
            fs::write(circuit.join("src/main.nr"), "fn main() {}").unwrap();
            let mock = Arc::new(MockToolchain::new());
            let orchestrator = Orchestrator::new(
                Toolchain::from_backend(mock.clone()),
                Arc::new(FsCacheStore::new(root.path().join("work/cache"))),
                circuit,
            );
            Self {
                root,
                mock,
                orchestrator,
            }
        }

        fn workspace(&self) -> RequestWorkspace {
            let ws = RequestWorkspace::create(&self.root.path().join("work")).unwrap();
            fs::write(ws.prover_toml(), "domain = 1\n").unwrap();
            ws
        }
    }

    #[test]
    fn second_run_reuses_cached_artifacts() {
        let fx = Fixture::new();
        let first = fx.orchestrator.run(&fx.workspace()).unwrap();
        assert!(first.verified);
        assert!(!first.program_cached && !first.vk_cached);

        let second = fx.orchestrator.run(&fx.workspace()).unwrap();
        assert!(second.verified);
        assert!(second.program_cached && second.vk_cached);
        assert_eq!(first.fingerprint, second.fingerprint);

        assert_eq!(fx.mock.compiles(), 1);
        assert_eq!(fx.mock.keygens(), 1);
        assert_eq!(fx.mock.proves(), 2);
        assert_eq!(fx.mock.verifies(), 2);
    }

    #[test]
    fn edited_circuit_is_rebuilt() {
        let fx = Fixture::new();
        let a = fx.orchestrator.run(&fx.workspace()).unwrap();
        fs::write(
            fx.orchestrator.circuit_dir().join("src/main.nr"),
            "fn main() { assert(true); }",
        )
        .unwrap();
        let b = fx.orchestrator.run(&fx.workspace()).unwrap();
        assert_ne!(a.fingerprint, b.fingerprint);
        assert!(!b.program_cached);
        assert_eq!(fx.mock.compiles(), 2);
        assert_eq!(fx.orchestrator.cache().entries().unwrap().len(), 4);
    }

    #[test]
    fn prove_failure_names_stage_and_stops() {
        let fx = Fixture::new();
        fx.mock.fail_at(Some(PipelineStage::Prove));
        match fx.orchestrator.run(&fx.workspace()) {
            Err(AuraxError::ProofPipelineFailed { stage, .. }) => {
                assert_eq!(stage, PipelineStage::Prove)
            }
            other => panic!("expected ProofPipelineFailed, got {other:?}"),
        }
        assert_eq!(fx.mock.keygens(), 0);
        assert_eq!(fx.mock.verifies(), 0);
    }

    #[test]
    fn failed_compile_is_not_cached() {
        let fx = Fixture::new();
        fx.mock.fail_at(Some(PipelineStage::Compile));
        assert!(fx.orchestrator.run(&fx.workspace()).is_err());
        fx.mock.fail_at(None);
        let outcome = fx.orchestrator.run(&fx.workspace()).unwrap();
        assert!(!outcome.program_cached);
        assert_eq!(fx.mock.compiles(), 2);
    }

    #[test]
    fn rejected_proof_is_not_an_error() {
        let fx = Fixture::new();
        fx.mock.set_reject(true);
        let outcome = fx.orchestrator.run(&fx.workspace()).unwrap();
        assert!(!outcome.verified);
    }

    #[test]
    fn missing_circuit_fails_at_compile() {
        let fx = Fixture::new();
        fs::remove_file(fx.orchestrator.circuit_dir().join("Nargo.toml")).unwrap();
        match fx.orchestrator.run(&fx.workspace()) {
            Err(AuraxError::ProofPipelineFailed { stage, .. }) => {
                assert_eq!(stage, PipelineStage::Compile)
            }
            other => panic!("expected ProofPipelineFailed, got {other:?}"),
        }
        assert_eq!(fx.mock.compiles(), 0);
    }

    #[test]
    fn concurrent_first_runs_compile_once() {
        let fx = Arc::new(Fixture::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let fx = Arc::clone(&fx);
                std::thread::spawn(move || {
                    let ws = fx.workspace();
                    fx.orchestrator.run(&ws).unwrap().verified
                })
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(fx.mock.compiles(), 1);
        assert_eq!(fx.mock.keygens(), 1);
        assert_eq!(fx.mock.proves(), 4);
    }
}

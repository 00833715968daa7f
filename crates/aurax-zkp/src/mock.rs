//! # Mock Toolchain
//!
//! A deterministic, transparent stand-in for `nargo`/`bb` used by tests and
//! local development. It provides no zero-knowledge guarantees.
//!
//! - The program is a digest of the circuit manifest.
//! - The verification key is a digest of the program.
//! - A proof binds the verification key to a digest of the witness input.
//!
//! Verification accepts a proof exactly when it was produced for the same
//! program. Invocation counts are recorded per capability, and a stage can be
//! made to fail or the verifier made to reject.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use aurax_core::PipelineStage;

use crate::cache::hex;
use crate::traits::{Compiler, KeyGenerator, ProveInputs, Prover, ToolError, Verifier};

const PROOF_HEADER: &str = "mock-proof";

/// In-process toolchain with invocation counters.
#[derive(Debug, Default)]
pub struct MockToolchain {
    compiles: AtomicUsize,
    proves: AtomicUsize,
    keygens: AtomicUsize,
    verifies: AtomicUsize,
    reject: AtomicBool,
    fail_at: Mutex<Option<PipelineStage>>,
}

impl MockToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the verifier reject every proof.
    pub fn set_reject(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    /// Make one stage fail as if its tool exited non-zero.
    pub fn fail_at(&self, stage: Option<PipelineStage>) {
        *self.fail_at.lock() = stage;
    }

    pub fn compiles(&self) -> usize {
        self.compiles.load(Ordering::SeqCst)
    }

    pub fn proves(&self) -> usize {
        self.proves.load(Ordering::SeqCst)
    }

    pub fn keygens(&self) -> usize {
        self.keygens.load(Ordering::SeqCst)
    }

    pub fn verifies(&self) -> usize {
        self.verifies.load(Ordering::SeqCst)
    }

    fn check(&self, stage: PipelineStage) -> Result<(), ToolError> {
        if *self.fail_at.lock() == Some(stage) {
            return Err(ToolError::Exit {
                program: "mock".into(),
                status: "exit status: 1".into(),
                stderr: format!("injected {stage} failure"),
            });
        }
        Ok(())
    }
}

fn digest(bytes: &[u8]) -> String {
    hex(&Sha256::digest(bytes))
}

impl Compiler for MockToolchain {
    fn compile(&self, circuit_dir: &Path, program_out: &Path) -> Result<(), ToolError> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        self.check(PipelineStage::Compile)?;
        let manifest = fs::read(circuit_dir.join("Nargo.toml"))?;
        fs::write(program_out, format!("mock-program:{}", digest(&manifest)))?;
        Ok(())
    }
}

impl Prover for MockToolchain {
    fn prove(&self, inputs: &ProveInputs<'_>) -> Result<(), ToolError> {
        self.proves.fetch_add(1, Ordering::SeqCst);
        self.check(PipelineStage::Prove)?;
        let program = fs::read(inputs.program)?;
        let witness = fs::read(inputs.prover_toml)?;
        fs::write(
            inputs.proof_out,
            format!("{PROOF_HEADER}\n{}\n{}\n", digest(&program), digest(&witness)),
        )?;
        Ok(())
    }
}

impl KeyGenerator for MockToolchain {
    fn write_verification_key(&self, program: &Path, vk_out: &Path) -> Result<(), ToolError> {
        self.keygens.fetch_add(1, Ordering::SeqCst);
        self.check(PipelineStage::KeyGenerate)?;
        let program = fs::read(program)?;
        fs::write(vk_out, digest(&program))?;
        Ok(())
    }
}

impl Verifier for MockToolchain {
    fn verify(&self, vk: &Path, proof: &Path) -> Result<bool, ToolError> {
        self.verifies.fetch_add(1, Ordering::SeqCst);
        self.check(PipelineStage::Verify)?;
        if self.reject.load(Ordering::SeqCst) {
            return Ok(false);
        }
        let vk = fs::read_to_string(vk)?;
        let proof = fs::read_to_string(proof)?;
        let mut lines = proof.lines();
        Ok(lines.next() == Some(PROOF_HEADER) && lines.next() == Some(vk.trim()))
    }
}

//! # Toolchain Capabilities
//!
//! The external compile/prove/key-generate/verify tools are modelled as four
//! capability traits. The orchestrator depends only on these, so an
//! in-process proving library can replace the subprocess backends without
//! changing it.
//!
//! All four are synchronous and object-safe. Implementations block for the
//! duration of the external call and must be `Send + Sync`; callers on an
//! async runtime run them on a blocking thread.

use std::path::Path;

use thiserror::Error;

use aurax_core::{AuraxError, PipelineStage};

/// Failure of one external tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The tool ran and exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: String,
        stderr: String,
    },
    /// The tool exceeded its time budget and was killed.
    #[error("{program} timed out after {secs}s")]
    Timeout { program: String, secs: u64 },
    /// Reading or writing an artifact failed.
    #[error("artifact i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Attribute this failure to a pipeline stage.
    pub fn at(self, stage: PipelineStage) -> AuraxError {
        AuraxError::ProofPipelineFailed {
            stage,
            detail: self.to_string(),
        }
    }
}

/// Paths handed to a [`Prover`].
#[derive(Debug, Clone, Copy)]
pub struct ProveInputs<'a> {
    /// Circuit package source directory.
    pub circuit_dir: &'a Path,
    /// Compiled program artifact.
    pub program: &'a Path,
    /// Witness input file for this request.
    pub prover_toml: &'a Path,
    /// Private scratch directory for this request.
    pub work_dir: &'a Path,
    /// Where the proof must be written.
    pub proof_out: &'a Path,
}

/// Compiles circuit source into a program artifact.
pub trait Compiler: Send + Sync {
    /// Compile the package in `circuit_dir` and write the program to
    /// `program_out`.
    fn compile(&self, circuit_dir: &Path, program_out: &Path) -> Result<(), ToolError>;
}

/// Produces a proof from a program and a witness input file.
pub trait Prover: Send + Sync {
    /// Solve the witness and write a proof to `inputs.proof_out`.
    fn prove(&self, inputs: &ProveInputs<'_>) -> Result<(), ToolError>;
}

/// Derives a verification key from a program.
pub trait KeyGenerator: Send + Sync {
    fn write_verification_key(&self, program: &Path, vk_out: &Path) -> Result<(), ToolError>;
}

/// Checks a proof against a verification key.
pub trait Verifier: Send + Sync {
    /// `Ok(false)` means the tool ran and rejected the proof. `Err` means the
    /// check could not be carried out.
    fn verify(&self, vk: &Path, proof: &Path) -> Result<bool, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_maps_to_stage() {
        let err = ToolError::Timeout {
            program: "bb".into(),
            secs: 5,
        }
        .at(PipelineStage::Prove);
        match err {
            AuraxError::ProofPipelineFailed { stage, detail } => {
                assert_eq!(stage, PipelineStage::Prove);
                assert!(detail.contains("timed out"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn exit_error_carries_stderr() {
        let err = ToolError::Exit {
            program: "nargo".into(),
            status: "exit status: 1".into(),
            stderr: "Cannot satisfy constraint".into(),
        };
        assert!(err.to_string().contains("Cannot satisfy constraint"));
    }
}

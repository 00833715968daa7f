//! Per-request scratch directories.
//!
//! Each verification request writes its witness input, solved witness, and
//! proof into a private directory under `{work}/requests/`. Concurrent
//! requests therefore never share a witness or proof path. The directory
//! is removed when the [`RequestWorkspace`] is dropped.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use uuid::Uuid;

/// File name of the witness input inside a workspace.
pub const PROVER_TOML: &str = "Prover.toml";

/// File name of the proof inside a workspace.
pub const PROOF_FILE: &str = "proof";

/// A private working directory for one request.
#[derive(Debug)]
pub struct RequestWorkspace {
    id: Uuid,
    dir: TempDir,
}

impl RequestWorkspace {
    /// Create a fresh workspace under `{work_root}/requests`.
    pub fn create(work_root: &Path) -> io::Result<Self> {
        let parent = work_root.join("requests");
        std::fs::create_dir_all(&parent)?;
        let id = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("{id}-"))
            .tempdir_in(&parent)?;
        Ok(Self { id, dir })
    }

    /// Request identifier, also used in log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn prover_toml(&self) -> PathBuf {
        self.path().join(PROVER_TOML)
    }

    pub fn proof(&self) -> PathBuf {
        self.path().join(PROOF_FILE)
    }
}

//! # Noir Toolchain Backend
//!
//! Implements the capability traits by shelling out to `nargo` (compile,
//! witness solving) and `bb` (prove, verification key, verify).
//!
//! | Capability     | Invocation |
//! |----------------|------------|
//! | `Compiler`     | `nargo compile --program-dir {circuit}`, then copy `target/{package}.json` |
//! | `Prover`       | `nargo execute --program-dir {staged} witness`, then `bb prove -b {program} -w witness.gz -o {proof}` |
//! | `KeyGenerator` | `bb write_vk -b {program} -o {vk}` |
//! | `Verifier`     | `bb verify -k {vk} -p {proof}` |
//!
//! `nargo execute` reads `Prover.toml` from the package root and writes the
//! solved witness under the package's `target/`. To keep requests isolated
//! the package manifest and sources are staged into the request workspace
//! and executed there. Relative `path` dependencies are rewritten to
//! absolute paths under the original package so they still resolve.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

use crate::process;
use crate::traits::{Compiler, KeyGenerator, ProveInputs, Prover, ToolError, Verifier};

const WITNESS_NAME: &str = "witness";

#[derive(Debug, Deserialize)]
struct Manifest {
    package: Package,
}

#[derive(Debug, Deserialize)]
struct Package {
    name: String,
}

/// Read the package name from `{circuit_dir}/Nargo.toml`.
pub fn package_name(circuit_dir: &Path) -> Result<String, ToolError> {
    let text = fs::read_to_string(circuit_dir.join("Nargo.toml"))?;
    let manifest: Manifest = toml::from_str(&text).map_err(invalid_manifest)?;
    Ok(manifest.package.name)
}

fn invalid_manifest(e: impl std::fmt::Display) -> ToolError {
    ToolError::Io(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("Nargo.toml: {e}"),
    ))
}

/// The manifest at `{circuit_dir}/Nargo.toml` with every relative
/// dependency `path` made absolute against `circuit_dir`.
fn relocated_manifest(circuit_dir: &Path) -> Result<String, ToolError> {
    let root = fs::canonicalize(circuit_dir)?;
    let text = fs::read_to_string(root.join("Nargo.toml"))?;
    let mut manifest: toml::Table = text.parse().map_err(invalid_manifest)?;

    if let Some(toml::Value::Table(deps)) = manifest.get_mut("dependencies") {
        for (_, dep) in deps.iter_mut() {
            if let Some(toml::Value::String(path)) = dep.get_mut("path") {
                *path = root.join(&*path).to_string_lossy().into_owned();
            }
        }
    }
    toml::to_string(&manifest).map_err(invalid_manifest)
}

/// `nargo` + `bb` subprocess toolchain.
#[derive(Debug, Clone)]
pub struct NargoToolchain {
    nargo: PathBuf,
    bb: PathBuf,
    timeout: Duration,
}

impl NargoToolchain {
    pub fn new(nargo: impl Into<PathBuf>, bb: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            nargo: nargo.into(),
            bb: bb.into(),
            timeout,
        }
    }

    fn nargo(&self) -> Command {
        Command::new(&self.nargo)
    }

    fn bb(&self) -> Command {
        Command::new(&self.bb)
    }

    fn stage_package(
        circuit_dir: &Path,
        staged: &Path,
        prover_toml: &Path,
    ) -> Result<(), ToolError> {
        fs::create_dir_all(staged)?;
        fs::write(staged.join("Nargo.toml"), relocated_manifest(circuit_dir)?)?;
        copy_tree(&circuit_dir.join("src"), &staged.join("src"))?;
        fs::copy(prover_toml, staged.join("Prover.toml"))?;
        Ok(())
    }
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

impl Compiler for NargoToolchain {
    fn compile(&self, circuit_dir: &Path, program_out: &Path) -> Result<(), ToolError> {
        let name = package_name(circuit_dir)?;
        let mut cmd = self.nargo();
        cmd.arg("compile").arg("--program-dir").arg(circuit_dir);
        process::run(cmd, self.timeout)?;
        fs::copy(circuit_dir.join("target").join(format!("{name}.json")), program_out)?;
        Ok(())
    }
}

impl Prover for NargoToolchain {
    fn prove(&self, inputs: &ProveInputs<'_>) -> Result<(), ToolError> {
        let staged = inputs.work_dir.join("package");
        Self::stage_package(inputs.circuit_dir, &staged, inputs.prover_toml)?;

        let mut execute = self.nargo();
        execute
            .arg("execute")
            .arg("--program-dir")
            .arg(&staged)
            .arg(WITNESS_NAME);
        process::run(execute, self.timeout)?;

        let witness = staged.join("target").join(format!("{WITNESS_NAME}.gz"));
        let mut prove = self.bb();
        prove
            .arg("prove")
            .arg("-b")
            .arg(inputs.program)
            .arg("-w")
            .arg(&witness)
            .arg("-o")
            .arg(inputs.proof_out);
        process::run(prove, self.timeout)?;
        Ok(())
    }
}

impl KeyGenerator for NargoToolchain {
    fn write_verification_key(&self, program: &Path, vk_out: &Path) -> Result<(), ToolError> {
        let mut cmd = self.bb();
        cmd.arg("write_vk").arg("-b").arg(program).arg("-o").arg(vk_out);
        process::run(cmd, self.timeout)?;
        Ok(())
    }
}

impl Verifier for NargoToolchain {
    fn verify(&self, vk: &Path, proof: &Path) -> Result<bool, ToolError> {
        let mut cmd = self.bb();
        cmd.arg("verify").arg("-k").arg(vk).arg("-p").arg(proof);
        match process::run(cmd, self.timeout) {
            Ok(_) => Ok(true),
            Err(ToolError::Exit { status, stderr, .. }) => {
                tracing::info!(%status, stderr = %stderr, "verifier rejected proof");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_package_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("Nargo.toml"),
            "[package]\nname = \"expert_gate\"\ntype = \"bin\"\n\n[dependencies]\njwt = { tag = \"v0.4.4\", git = \"https://github.com/zkemail/noir-jwt\" }\n",
        )
        .unwrap();
        assert_eq!(package_name(dir.path()).unwrap(), "expert_gate");
    }

    #[test]
    fn manifest_without_package_is_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Nargo.toml"), "[workspace]\nmembers = []\n").unwrap();
        assert!(matches!(package_name(dir.path()), Err(ToolError::Io(_))));
    }

    #[test]
    fn stages_sources_and_witness() {
        let circuit = tempfile::tempdir().unwrap();
        fs::create_dir_all(circuit.path().join("src/inner")).unwrap();
        fs::write(circuit.path().join("Nargo.toml"), "[package]\nname = \"g\"\n").unwrap();
        fs::write(circuit.path().join("src/main.nr"), "fn main() {}").unwrap();
        fs::write(circuit.path().join("src/inner/x.nr"), "// x").unwrap();
        let work = tempfile::tempdir().unwrap();
        let toml = work.path().join("Prover.toml");
        fs::write(&toml, "domain = 1").unwrap();

        let staged = work.path().join("package");
        NargoToolchain::stage_package(circuit.path(), &staged, &toml).unwrap();
        assert!(staged.join("src/inner/x.nr").is_file());
        assert_eq!(fs::read_to_string(staged.join("Prover.toml")).unwrap(), "domain = 1");
    }

    #[test]
    fn staged_manifest_keeps_path_dependencies_resolvable() {
        let root = tempfile::tempdir().unwrap();
        let circuit = root.path().join("circuit");
        let lib = root.path().join("lib");
        fs::create_dir_all(circuit.join("src")).unwrap();
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("Nargo.toml"), "[package]\nname = \"helper\"\n").unwrap();
        fs::write(circuit.join("src/main.nr"), "fn main() {}").unwrap();
        fs::write(
            circuit.join("Nargo.toml"),
            "[package]\nname = \"g\"\ntype = \"bin\"\n\n[dependencies]\nhelper = { path = \"../lib\" }\njwt = { tag = \"v0.4.4\", git = \"https://github.com/zkemail/noir-jwt\" }\n",
        )
        .unwrap();
        let work = tempfile::tempdir().unwrap();
        let toml_path = work.path().join("Prover.toml");
        fs::write(&toml_path, "domain = 1").unwrap();

        let staged = work.path().join("package");
        NargoToolchain::stage_package(&circuit, &staged, &toml_path).unwrap();

        let manifest: toml::Table = fs::read_to_string(staged.join("Nargo.toml"))
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(manifest["package"]["name"].as_str(), Some("g"));
        let dep = PathBuf::from(manifest["dependencies"]["helper"]["path"].as_str().unwrap());
        assert!(dep.is_absolute());
        assert!(dep.join("Nargo.toml").is_file());
        assert_eq!(
            manifest["dependencies"]["jwt"]["git"].as_str(),
            Some("https://github.com/zkemail/noir-jwt")
        );
        assert_eq!(package_name(&staged).unwrap(), "g");
    }

    #[cfg(unix)]
    #[test]
    fn missing_binaries_surface_spawn_errors() {
        let tc = NargoToolchain::new(
            "/nonexistent/nargo",
            "/nonexistent/bb",
            Duration::from_secs(1),
        );
        let dir = tempfile::tempdir().unwrap();
        let vk = dir.path().join("vk");
        let proof = dir.path().join("proof");
        assert!(matches!(
            tc.verify(&vk, &proof),
            Err(ToolError::Spawn { .. })
        ));
        assert!(matches!(
            tc.write_verification_key(&proof, &vk),
            Err(ToolError::Spawn { .. })
        ));
    }
}

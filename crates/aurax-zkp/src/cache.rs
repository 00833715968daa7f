//! # Artifact Cache
//!
//! The compiled program and its verification key depend only on the
//! circuit source, never on a request's witness. They are stored under a
//! [`CircuitFingerprint`] (SHA-256 over `Nargo.toml` and every `src/**/*.nr`
//! file) so an edited circuit is rebuilt instead of silently reusing stale
//! artifacts.
//!
//! ## Layout
//!
//! [`FsCacheStore`] keeps `{root}/{kind}/{fingerprint}`. Entries are written
//! to a temporary sibling and renamed into place, so a present entry is
//! always complete.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// Kind of cached build artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Compiled circuit program.
    Program,
    /// Verification key derived from the program.
    VerificationKey,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 2] = [ArtifactKind::Program, ArtifactKind::VerificationKey];

    /// Directory name under the cache root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::VerificationKey => "vk",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content fingerprint of a circuit package, as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CircuitFingerprint(String);

impl CircuitFingerprint {
    /// Hash `Nargo.toml` and all `.nr` files under `src/` in `circuit_dir`.
    ///
    /// Files are visited in sorted relative-path order; each contributes its
    /// path, its length, and its contents.
    pub fn compute(circuit_dir: &Path) -> io::Result<Self> {
        let mut files = vec![PathBuf::from("Nargo.toml")];
        let src = circuit_dir.join("src");
        if src.is_dir() {
            collect_sources(circuit_dir, &src, &mut files)?;
        }
        files.sort();

        let mut hasher = Sha256::new();
        for rel in &files {
            let contents = fs::read(circuit_dir.join(rel))?;
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            hasher.update((contents.len() as u64).to_be_bytes());
            hasher.update(&contents);
        }
        Ok(Self::from_digest(&hasher.finalize()))
    }

    fn from_digest(digest: &[u8]) -> Self {
        Self(hex(digest))
    }

    /// Accept an existing hex fingerprint (e.g. a cache directory entry).
    pub fn parse(hex: &str) -> Option<Self> {
        let valid = hex.len() == 64 && hex.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        valid.then(|| Self(hex.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..12]
    }
}

impl fmt::Display for CircuitFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercase hex encoding.
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn collect_sources(base: &Path, dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_sources(base, &path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "nr") {
            if let Ok(rel) = path.strip_prefix(base) {
                out.push(rel.to_path_buf());
            }
        }
    }
    Ok(())
}

/// One stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub kind: ArtifactKind,
    pub fingerprint: CircuitFingerprint,
    pub size: u64,
}

/// Fingerprint-keyed artifact storage.
pub trait CacheStore: Send + Sync {
    /// Path of the stored artifact, if present.
    fn get(&self, kind: ArtifactKind, fingerprint: &CircuitFingerprint) -> io::Result<Option<PathBuf>>;

    /// Store the file at `source` and return the stored path.
    fn put(
        &self,
        kind: ArtifactKind,
        fingerprint: &CircuitFingerprint,
        source: &Path,
    ) -> io::Result<PathBuf>;

    /// All stored artifacts.
    fn entries(&self) -> io::Result<Vec<CacheEntry>>;

    /// Remove every stored artifact, returning how many were removed.
    fn clear(&self) -> io::Result<usize>;
}

/// Filesystem-backed [`CacheStore`].
#[derive(Debug, Clone)]
pub struct FsCacheStore {
    root: PathBuf,
}

impl FsCacheStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, kind: ArtifactKind, fingerprint: &CircuitFingerprint) -> PathBuf {
        self.root.join(kind.as_str()).join(fingerprint.as_str())
    }
}

impl CacheStore for FsCacheStore {
    fn get(&self, kind: ArtifactKind, fingerprint: &CircuitFingerprint) -> io::Result<Option<PathBuf>> {
        let path = self.path_for(kind, fingerprint);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(Some(path)),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn put(
        &self,
        kind: ArtifactKind,
        fingerprint: &CircuitFingerprint,
        source: &Path,
    ) -> io::Result<PathBuf> {
        let dest = self.path_for(kind, fingerprint);
        let dir = self.root.join(kind.as_str());
        fs::create_dir_all(&dir)?;
        let staging = dir.join(format!(".{}.{}.tmp", fingerprint.as_str(), uuid::Uuid::new_v4()));
        fs::copy(source, &staging)?;
        if let Err(e) = fs::rename(&staging, &dest) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }
        tracing::debug!(%kind, fingerprint = fingerprint.short(), "artifact cached");
        Ok(dest)
    }

    fn entries(&self) -> io::Result<Vec<CacheEntry>> {
        let mut out = Vec::new();
        for kind in ArtifactKind::ALL {
            let dir = self.root.join(kind.as_str());
            let listing = match fs::read_dir(&dir) {
                Ok(listing) => listing,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            for entry in listing {
                let entry = entry?;
                let name = entry.file_name();
                let Some(fingerprint) = CircuitFingerprint::parse(&name.to_string_lossy()) else {
                    continue;
                };
                let meta = entry.metadata()?;
                if meta.is_file() {
                    out.push(CacheEntry {
                        kind,
                        fingerprint,
                        size: meta.len(),
                    });
                }
            }
        }
        out.sort_by(|a, b| (a.kind.as_str(), &a.fingerprint).cmp(&(b.kind.as_str(), &b.fingerprint)));
        Ok(out)
    }

    fn clear(&self) -> io::Result<usize> {
        let count = self.entries()?.len();
        for kind in ArtifactKind::ALL {
            let dir = self.root.join(kind.as_str());
            match fs::remove_dir_all(&dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circuit(dir: &Path, main: &str) {
        fs::create_dir_all(dir.join("src/lib")).unwrap();
        fs::write(dir.join("Nargo.toml"), "[package]\nname = \"gate\"\ntype = \"bin\"\n").unwrap();
        fs::write(dir.join("src/main.nr"), main).unwrap();
        fs::write(dir.join("src/lib/util.nr"), "fn id(x: Field) -> Field { x }").unwrap();
    }

    #[test]
    fn fingerprint_is_stable_and_content_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        circuit(dir.path(), "fn main() {}");
        let a = CircuitFingerprint::compute(dir.path()).unwrap();
        let b = CircuitFingerprint::compute(dir.path()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);

        fs::write(dir.path().join("src/main.nr"), "fn main() { assert(1 == 1); }").unwrap();
        let c = CircuitFingerprint::compute(dir.path()).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn fingerprint_ignores_non_source_files() {
        let dir = tempfile::tempdir().unwrap();
        circuit(dir.path(), "fn main() {}");
        let a = CircuitFingerprint::compute(dir.path()).unwrap();
        fs::write(dir.path().join("Prover.toml"), "x = 1").unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        fs::write(dir.path().join("target/gate.json"), "{}").unwrap();
        fs::write(dir.path().join("src/notes.md"), "docs").unwrap();
        assert_eq!(a, CircuitFingerprint::compute(dir.path()).unwrap());
    }

    #[test]
    fn fingerprint_requires_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CircuitFingerprint::compute(dir.path()).is_err());
    }

    #[test]
    fn parse_accepts_only_hex_digests() {
        assert!(CircuitFingerprint::parse(&"ab".repeat(32)).is_some());
        assert!(CircuitFingerprint::parse("abc").is_none());
        assert!(CircuitFingerprint::parse(&"AB".repeat(32)).is_none());
    }

    #[test]
    fn put_get_entries_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(dir.path().join("cache"));
        let fp = CircuitFingerprint::parse(&"0f".repeat(32)).unwrap();
        assert_eq!(store.get(ArtifactKind::Program, &fp).unwrap(), None);

        let src = dir.path().join("program.json");
        fs::write(&src, b"{\"bytecode\":\"\"}").unwrap();
        let stored = store.put(ArtifactKind::Program, &fp, &src).unwrap();
        assert_eq!(store.get(ArtifactKind::Program, &fp).unwrap(), Some(stored.clone()));
        assert_eq!(fs::read(&stored).unwrap(), b"{\"bytecode\":\"\"}");
        assert_eq!(store.get(ArtifactKind::VerificationKey, &fp).unwrap(), None);

        let entries = store.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, ArtifactKind::Program);
        assert_eq!(entries[0].size, 15);

        assert_eq!(store.clear().unwrap(), 1);
        assert!(store.entries().unwrap().is_empty());
    }

    #[test]
    fn empty_store_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(dir.path().join("missing"));
        assert!(store.entries().unwrap().is_empty());
        assert_eq!(store.clear().unwrap(), 0);
    }
}

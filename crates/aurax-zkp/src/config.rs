//! Pipeline configuration.
//!
//! Values come from an optional TOML file, then `AURAX_*` environment
//! variables override individual fields. Every field has a default, so an
//! empty file (or no file) is a valid configuration.
//!
//! ```toml
//! circuit_dir = "../circuit"
//! work_dir = "/var/lib/aurax"
//! nargo_bin = "nargo"
//! bb_bin = "bb"
//! tool_timeout_secs = 300
//! expert_domains = ["gmail.com", "edu"]
//! max_signed_data_len = 1200
//! precompute_keys = ["email", "email_verified"]
//! mock_toolchain = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use aurax_core::authorization::DEFAULT_EXPERT_DOMAINS;
use aurax_witness::compiler::DEFAULT_PRECOMPUTE_KEYS;
use aurax_witness::WitnessParams;

/// Default external tool timeout.
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 300;

/// Settings for the witness compiler, toolchain, and authorization policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Circuit package directory (contains `Nargo.toml`).
    pub circuit_dir: PathBuf,
    /// Root for the artifact cache and request workspaces.
    pub work_dir: PathBuf,
    pub nargo_bin: PathBuf,
    pub bb_bin: PathBuf,
    /// Per-invocation limit for external tools.
    pub tool_timeout_secs: u64,
    /// Domains whose verified credentials grant expert status.
    pub expert_domains: Vec<String>,
    pub max_signed_data_len: usize,
    pub precompute_keys: Vec<String>,
    /// Use the in-process mock toolchain instead of `nargo`/`bb`.
    pub mock_toolchain: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            circuit_dir: PathBuf::from("circuit"),
            work_dir: std::env::temp_dir().join("aurax"),
            nargo_bin: PathBuf::from("nargo"),
            bb_bin: PathBuf::from("bb"),
            tool_timeout_secs: DEFAULT_TOOL_TIMEOUT_SECS,
            expert_domains: DEFAULT_EXPERT_DOMAINS.iter().map(|d| d.to_string()).collect(),
            max_signed_data_len: aurax_core::PAYLOAD_CAPACITY,
            precompute_keys: DEFAULT_PRECOMPUTE_KEYS.iter().map(|k| k.to_string()).collect(),
            mock_toolchain: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {0}: {1}")]
    Read(String, #[source] std::io::Error),
    #[error("invalid config file {0}: {1}")]
    Parse(String, #[source] toml::de::Error),
    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),
}

impl PipelineConfig {
    /// Load from `path` (if given), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        base.with_env(|var| std::env::var(var).ok())
    }

    /// Parse a TOML file without environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e))?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse(path.display().to_string(), e))
    }

    /// Apply overrides from `lookup`, which maps a variable name to its
    /// value.
    ///
    /// Variables:
    /// - `AURAX_CIRCUIT_DIR`, `AURAX_WORK_DIR`, `AURAX_NARGO_BIN`, `AURAX_BB_BIN`
    /// - `AURAX_TOOL_TIMEOUT_SECS`
    /// - `AURAX_EXPERT_DOMAINS` (comma-separated)
    /// - `AURAX_MAX_SIGNED_DATA_LEN`
    /// - `AURAX_PRECOMPUTE_KEYS` (comma-separated)
    /// - `AURAX_MOCK_TOOLCHAIN` (`1`/`true`/`0`/`false`)
    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("AURAX_CIRCUIT_DIR") {
            self.circuit_dir = v.into();
        }
        if let Some(v) = lookup("AURAX_WORK_DIR") {
            self.work_dir = v.into();
        }
        if let Some(v) = lookup("AURAX_NARGO_BIN") {
            self.nargo_bin = v.into();
        }
        if let Some(v) = lookup("AURAX_BB_BIN") {
            self.bb_bin = v.into();
        }
        if let Some(v) = lookup("AURAX_TOOL_TIMEOUT_SECS") {
            self.tool_timeout_secs = parse_number("AURAX_TOOL_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("AURAX_EXPERT_DOMAINS") {
            self.expert_domains = split_list(&v);
        }
        if let Some(v) = lookup("AURAX_MAX_SIGNED_DATA_LEN") {
            self.max_signed_data_len = parse_number("AURAX_MAX_SIGNED_DATA_LEN", &v)?;
        }
        if let Some(v) = lookup("AURAX_PRECOMPUTE_KEYS") {
            self.precompute_keys = split_list(&v);
        }
        if let Some(v) = lookup("AURAX_MOCK_TOOLCHAIN") {
            self.mock_toolchain = parse_flag("AURAX_MOCK_TOOLCHAIN", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tool_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "tool_timeout_secs".into(),
                "0".into(),
            ));
        }
        if self.max_signed_data_len == 0 || self.max_signed_data_len > aurax_core::PAYLOAD_CAPACITY {
            return Err(ConfigError::InvalidValue(
                "max_signed_data_len".into(),
                self.max_signed_data_len.to_string(),
            ));
        }
        if self.precompute_keys.is_empty() {
            return Err(ConfigError::InvalidValue(
                "precompute_keys".into(),
                String::new(),
            ));
        }
        Ok(())
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn witness_params(&self) -> WitnessParams {
        WitnessParams {
            max_signed_data_len: self.max_signed_data_len,
            precompute_keys: self.precompute_keys.clone(),
        }
    }

    /// Root of the artifact cache.
    pub fn cache_dir(&self) -> PathBuf {
        self.work_dir.join("cache")
    }
}

fn parse_number<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(var.to_string(), raw.to_string()))
}

fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue(var.to_string(), raw.to_string())),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

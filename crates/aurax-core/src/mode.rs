//! Verification mode selected explicitly by the caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What a verification request sets out to prove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    /// Control of an email domain only. JWT fields carry neutral values.
    Domain,
    /// A provider-signed token for the address, plus the domain.
    Credential,
}

impl VerificationMode {
    /// Return the wire name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Domain => "domain",
            Self::Credential => "credential",
        }
    }

    /// Whether this mode consumes a signed token.
    pub fn requires_token(&self) -> bool {
        matches!(self, Self::Credential)
    }
}

impl fmt::Display for VerificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "domain" => Ok(Self::Domain),
            "credential" => Ok(Self::Credential),
            other => Err(format!(
                "unknown verification mode {other:?}; expected \"domain\" or \"credential\""
            )),
        }
    }
}

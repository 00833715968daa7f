//! # Email Addresses
//!
//! The domain fed to the circuit is the text after the `@`. The address
//! is validated once at the edge so that extraction is total.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AuraxError;

/// A syntactically plausible email address: one `@`, non-empty local part
/// and domain, no whitespace or control characters.
///
/// The domain is kept byte-for-byte as supplied. Case folding would change
/// the bytes the circuit commits to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress {
    address: String,
    at: usize,
}

impl EmailAddress {
    /// Parse and validate an address.
    pub fn parse(raw: &str) -> Result<Self, AuraxError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AuraxError::InvalidEmail("email is empty".into()));
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AuraxError::InvalidEmail(
                "email contains whitespace or control characters".into(),
            ));
        }
        let mut ats = trimmed.match_indices('@').map(|(i, _)| i);
        let at = match (ats.next(), ats.next()) {
            (Some(i), None) => i,
            (None, _) => return Err(AuraxError::InvalidEmail("email has no '@'".into())),
            (Some(_), Some(_)) => {
                return Err(AuraxError::InvalidEmail("email has more than one '@'".into()))
            }
        };
        if at == 0 {
            return Err(AuraxError::InvalidEmail("email local part is empty".into()));
        }
        let domain = &trimmed[at + 1..];
        if domain.is_empty() {
            return Err(AuraxError::InvalidEmail("email domain is empty".into()));
        }
        if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
            return Err(AuraxError::InvalidEmail(format!(
                "email domain {domain:?} has an empty label"
            )));
        }
        Ok(Self {
            address: trimmed.to_string(),
            at,
        })
    }

    /// The full address.
    pub fn as_str(&self) -> &str {
        &self.address
    }

    /// The part before the `@`.
    pub fn local_part(&self) -> &str {
        &self.address[..self.at]
    }

    /// The part after the `@`.
    pub fn domain(&self) -> &str {
        &self.address[self.at + 1..]
    }

    /// Case-insensitive address comparison, as providers treat addresses.
    pub fn matches(&self, other: &str) -> bool {
        self.address.eq_ignore_ascii_case(other.trim())
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = AuraxError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.address
    }
}

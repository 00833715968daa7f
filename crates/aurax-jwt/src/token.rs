//! # Compact Token Parser
//!
//! Splits a `header.payload.signature` token and decodes the header and
//! claims. The signature is decoded to bytes but never checked here.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use aurax_core::AuraxError;

/// Decode base64url, tolerating padding and the standard alphabet.
///
/// Providers emit unpadded base64url, but hand-built tokens often carry
/// `=` padding or `+`/`/`.
pub fn decode_base64url(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let trimmed = input.trim_end_matches('=');
    if trimmed.contains(['+', '/']) {
        STANDARD_NO_PAD.decode(trimmed)
    } else {
        URL_SAFE_NO_PAD.decode(trimmed)
    }
}

/// Decoded token header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHeader {
    /// Signature algorithm, e.g. `RS256`.
    pub alg: String,
    /// Identifier of the provider key that signed the token.
    pub kid: String,
    /// Token type, usually `JWT`.
    #[serde(default)]
    pub typ: Option<String>,
}

/// `email_verified` arrives as a boolean from most providers and as a
/// string from some older endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EmailVerified {
    Bool(bool),
    Text(String),
}

impl EmailVerified {
    /// Whether the provider asserts the address is verified.
    pub fn is_verified(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

/// Claims the gate reads from the token payload. Unknown claims are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    /// Audience: a string or an array of strings.
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<EmailVerified>,
}

/// A parsed, **unverified** compact token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    raw: String,
    header_end: usize,
    payload_end: usize,
    header: TokenHeader,
}

impl SignedToken {
    /// Parse a compact token and decode its header.
    ///
    /// Fails with [`AuraxError::MalformedToken`] unless the token has exactly
    /// three non-empty parts and the first part is base64-encoded JSON with
    /// `alg` and `kid`. Does not check the signature.
    pub fn parse(raw: &str) -> Result<Self, AuraxError> {
        let raw = raw.trim();
        let parts: Vec<&str> = raw.split('.').collect();
        if parts.len() != 3 {
            return Err(AuraxError::MalformedToken(format!(
                "expected 3 dot-separated parts, found {}",
                parts.len()
            )));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(AuraxError::MalformedToken("token has an empty part".into()));
        }

        let header_bytes = decode_base64url(parts[0])
            .map_err(|e| AuraxError::MalformedToken(format!("header is not base64: {e}")))?;
        let header: TokenHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| AuraxError::MalformedToken(format!("header is not valid JSON: {e}")))?;
        if header.kid.is_empty() {
            return Err(AuraxError::MalformedToken("header kid is empty".into()));
        }

        let header_end = parts[0].len();
        let payload_end = header_end + 1 + parts[1].len();
        Ok(Self {
            raw: raw.to_string(),
            header_end,
            payload_end,
            header,
        })
    }

    /// The decoded header.
    pub fn header(&self) -> &TokenHeader {
        &self.header
    }

    /// Identifier of the signing key.
    pub fn key_id(&self) -> &str {
        &self.header.kid
    }

    /// The base64 header segment.
    pub fn header_b64(&self) -> &str {
        &self.raw[..self.header_end]
    }

    /// The base64 payload segment.
    pub fn payload_b64(&self) -> &str {
        &self.raw[self.header_end + 1..self.payload_end]
    }

    /// The base64 signature segment.
    pub fn signature_b64(&self) -> &str {
        &self.raw[self.payload_end + 1..]
    }

    /// The bytes the signature covers: `header.payload` as ASCII.
    pub fn signed_data(&self) -> &[u8] {
        self.raw[..self.payload_end].as_bytes()
    }

    /// The decoded claims payload (raw JSON bytes).
    pub fn payload_json(&self) -> Result<Vec<u8>, AuraxError> {
        decode_base64url(self.payload_b64())
            .map_err(|e| AuraxError::MalformedToken(format!("payload is not base64: {e}")))
    }

    /// Decode the claims.
    pub fn claims(&self) -> Result<TokenClaims, AuraxError> {
        let json = self.payload_json()?;
        serde_json::from_slice(&json)
            .map_err(|e| AuraxError::MalformedToken(format!("claims are not valid JSON: {e}")))
    }

    /// Decode the raw signature bytes.
    pub fn signature(&self) -> Result<Vec<u8>, AuraxError> {
        decode_base64url(self.signature_b64())
            .map_err(|e| AuraxError::MalformedToken(format!("signature is not base64: {e}")))
    }

    /// The original token text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

//! JSON Web Key Set model (RFC 7517), restricted to what the gate needs.

use serde::{Deserialize, Serialize};

use aurax_core::AuraxError;

use crate::token::decode_base64url;

/// One provider key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kid: String,
    pub kty: String,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(rename = "use", default)]
    pub key_use: Option<String>,
    /// RSA modulus, base64url big-endian.
    #[serde(default)]
    pub n: Option<String>,
    /// RSA public exponent, base64url big-endian.
    #[serde(default)]
    pub e: Option<String>,
}

impl Jwk {
    /// Big-endian RSA modulus bytes.
    ///
    /// Fails with [`AuraxError::WitnessEncoding`] when the key is not an
    /// RSA key or its modulus is missing or undecodable.
    pub fn rsa_modulus(&self) -> Result<Vec<u8>, AuraxError> {
        if self.kty != "RSA" {
            return Err(AuraxError::WitnessEncoding(format!(
                "key {} has type {}, expected RSA",
                self.kid, self.kty
            )));
        }
        let n = self.n.as_deref().ok_or_else(|| {
            AuraxError::WitnessEncoding(format!("key {} has no modulus", self.kid))
        })?;
        let bytes = decode_base64url(n).map_err(|e| {
            AuraxError::WitnessEncoding(format!("key {} modulus is not base64: {e}", self.kid))
        })?;
        if bytes.iter().all(|b| *b == 0) {
            return Err(AuraxError::WitnessEncoding(format!(
                "key {} modulus is zero",
                self.kid
            )));
        }
        Ok(bytes)
    }
}

/// A provider key set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Find the key with identifier `kid`.
    pub fn find(&self, kid: &str) -> Option<&Jwk> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    /// Identifiers of all keys, for diagnostics.
    pub fn key_ids(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.kid.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOGLE_STYLE: &str = r#"{
        "keys": [
            {"kty":"RSA","alg":"RS256","use":"sig","kid":"a1","n":"AQAB","e":"AQAB"},
            {"kty":"RSA","alg":"RS256","use":"sig","kid":"b2","n":"wQ","e":"AQAB"}
        ]
    }"#;

    #[test]
    fn parses_provider_document() {
        let set: JwkSet = serde_json::from_str(GOOGLE_STYLE).unwrap();
        assert_eq!(set.key_ids(), vec!["a1", "b2"]);
        let key = set.find("b2").unwrap();
        assert_eq!(key.key_use.as_deref(), Some("sig"));
        assert_eq!(key.rsa_modulus().unwrap(), vec![0xc1]);
    }

    #[test]
    fn missing_kid_not_found() {
        let set: JwkSet = serde_json::from_str(GOOGLE_STYLE).unwrap();
        assert!(set.find("zz").is_none());
    }

    #[test]
    fn non_rsa_key_rejected() {
        let key = Jwk {
            kid: "ec".into(),
            kty: "EC".into(),
            alg: None,
            key_use: None,
            n: None,
            e: None,
        };
        assert!(matches!(
            key.rsa_modulus(),
            Err(AuraxError::WitnessEncoding(_))
        ));
    }

    #[test]
    fn zero_modulus_rejected() {
        let key = Jwk {
            kid: "z".into(),
            kty: "RSA".into(),
            alg: None,
            key_use: None,
            n: Some("AAA".into()),
            e: None,
        };
        assert!(key.rsa_modulus().is_err());
    }
}

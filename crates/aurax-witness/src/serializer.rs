//! # Prover.toml Serializer
//!
//! Renders a [`WitnessDocument`] in the field order and number formatting
//! the circuit's input parser expects:
//!
//! ```text
//! domain = { storage = [..64 bytes], len = N }
//! partial_data = { storage = [..1200 bytes], len = N }
//! partial_hash = [..8 words]
//! full_data_length = N
//! base64_decode_offset = N
//! jwt_pubkey_modulus_limbs = ["..", ..18 limbs]
//! jwt_pubkey_redc_params_limbs = ["..", ..18 limbs]
//! jwt_signature_limbs = ["..", ..18 limbs]
//! ```
//!
//! Limbs exceed 64 bits and are always rendered as quoted decimal strings;
//! every other number is a bare decimal integer.

use std::fmt::{Display, Write as _};
use std::io::Write as _;
use std::path::Path;

use aurax_core::{AuraxError, BoundedBuffer};

use crate::document::WitnessDocument;
use crate::limbs::LimbSet;

/// Render `doc` as `Prover.toml` text.
pub fn render_prover_toml(doc: &WitnessDocument) -> String {
    let jwt = doc.jwt();
    let mut out = String::with_capacity(8 * 1024);
    push_line(&mut out, "domain", bounded(doc.domain()));
    push_line(&mut out, "partial_data", bounded(&jwt.partial_data));
    push_line(&mut out, "partial_hash", array(jwt.partial_hash.words()));
    push_line(&mut out, "full_data_length", jwt.full_data_length);
    push_line(&mut out, "base64_decode_offset", jwt.base64_decode_offset);
    push_line(&mut out, "jwt_pubkey_modulus_limbs", limbs(&jwt.rsa.modulus));
    push_line(&mut out, "jwt_pubkey_redc_params_limbs", limbs(&jwt.rsa.redc));
    push_line(&mut out, "jwt_signature_limbs", limbs(&jwt.rsa.signature));
    out
}

/// Write `doc` to `path`, replacing any previous file.
///
/// The text is written to a sibling temporary file first and renamed into
/// place, so a reader never observes a half-written witness.
pub fn write_prover_toml(doc: &WitnessDocument, path: &Path) -> Result<(), AuraxError> {
    let text = render_prover_toml(doc);
    let tmp = path.with_extension("toml.tmp");
    {
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(text.as_bytes())?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "wrote witness file");
    Ok(())
}

fn push_line(out: &mut String, name: &str, value: impl Display) {
    // Writing to a String cannot fail.
    let _ = writeln!(out, "{name} = {value}");
}

fn array<T: Display>(items: &[T]) -> String {
    let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", parts.join(", "))
}

fn bounded<const N: usize>(buf: &BoundedBuffer<N>) -> String {
    format!("{{ storage = {}, len = {} }}", array(buf.storage()), buf.len())
}

fn limbs(set: &LimbSet) -> String {
    let quoted: Vec<String> = set
        .to_decimal_strings()
        .into_iter()
        .map(|l| format!("\"{l}\""))
        .collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurax_core::DomainBuffer;

    fn domain_doc() -> WitnessDocument {
        WitnessDocument::domain_only(DomainBuffer::from_domain("example.com").unwrap())
    }

    #[test]
    fn field_order_is_fixed() {
        let text = render_prover_toml(&domain_doc());
        let names: Vec<&str> = text
            .lines()
            .map(|l| l.split(" = ").next().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![
                "domain",
                "partial_data",
                "partial_hash",
                "full_data_length",
                "base64_decode_offset",
                "jwt_pubkey_modulus_limbs",
                "jwt_pubkey_redc_params_limbs",
                "jwt_signature_limbs",
            ]
        );
    }

    #[test]
    fn domain_line_is_exact() {
        let text = render_prover_toml(&domain_doc());
        let first = text.lines().next().unwrap();
        let mut expected = String::from("domain = { storage = [101, 120, 97, 109, 112, 108, 101, 46, 99, 111, 109");
        for _ in 0..53 {
            expected.push_str(", 0");
        }
        expected.push_str("], len = 11 }");
        assert_eq!(first, expected);
    }

    #[test]
    fn limbs_are_quoted() {
        let text = render_prover_toml(&domain_doc());
        let line = text
            .lines()
            .find(|l| l.starts_with("jwt_signature_limbs"))
            .unwrap();
        assert_eq!(line.matches("\"0\"").count(), 18);
    }

    #[test]
    fn output_parses_as_toml() {
        let text = render_prover_toml(&domain_doc());
        let value: toml::Value = toml::from_str(&text).unwrap();
        let storage = value["partial_data"]["storage"].as_array().unwrap();
        assert_eq!(storage.len(), 1200);
        assert_eq!(value["partial_hash"].as_array().unwrap().len(), 8);
        assert_eq!(value["full_data_length"].as_integer(), Some(0));
    }

    #[test]
    fn rendering_is_reproducible() {
        assert_eq!(render_prover_toml(&domain_doc()), render_prover_toml(&domain_doc()));
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Prover.toml");
        std::fs::write(&path, "stale").unwrap();
        write_prover_toml(&domain_doc(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_prover_toml(&domain_doc()));
        assert!(!path.with_extension("toml.tmp").exists());
    }
}

//! # Expert Authorization
//!
//! Maps a verified proof outcome to the binary "expert" flag consumed by
//! the prediction market.
//!
//! ## Rule
//!
//! Privileged status requires all three of: credential mode, a proof that
//! verified, and a domain on the allow-list. A domain-only proof shows
//! control of the domain, not a provider-asserted identity, so it never
//! yields privileged status even when it verifies.
//!
//! Allow-list entries match the domain exactly or as a dot-separated
//! suffix, ignoring ASCII case: `staff.gmail.com` matches `gmail.com`,
//! `notgmail.com` does not.

use serde::{Deserialize, Serialize};

use crate::mode::VerificationMode;

/// Allow-list entries used when no policy is configured.
pub const DEFAULT_EXPERT_DOMAINS: &[&str] = &["gmail.com", "edu"];

/// Outcome of the authorization rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationDecision {
    /// Whether the proof verified.
    pub verified: bool,
    /// Whether the caller gains expert status.
    pub privileged: bool,
}

/// Static allow-list of expert domains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertPolicy {
    domains: Vec<String>,
}

impl ExpertPolicy {
    /// Build a policy from allow-list entries. Entries are trimmed,
    /// stripped of a leading dot, and lowercased; empty entries are dropped.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    /// The normalized allow-list.
    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Whether `domain` is on the allow-list.
    pub fn is_expert_domain(&self, domain: &str) -> bool {
        let domain = domain.trim_end_matches('.').to_ascii_lowercase();
        self.domains.iter().any(|entry| {
            domain == *entry
                || (domain.len() > entry.len()
                    && domain.ends_with(entry.as_str())
                    && domain.as_bytes()[domain.len() - entry.len() - 1] == b'.')
        })
    }

    /// Apply the authorization rule.
    pub fn decide(
        &self,
        verified: bool,
        domain: &str,
        mode: VerificationMode,
    ) -> AuthorizationDecision {
        let privileged = verified
            && mode == VerificationMode::Credential
            && self.is_expert_domain(domain);
        AuthorizationDecision {
            verified,
            privileged,
        }
    }
}

impl Default for ExpertPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EXPERT_DOMAINS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_mode_never_privileged() {
        let policy = ExpertPolicy::default();
        let d = policy.decide(true, "example.com", VerificationMode::Domain);
        assert!(d.verified);
        assert!(!d.privileged);
        let d = policy.decide(true, "gmail.com", VerificationMode::Domain);
        assert!(!d.privileged);
    }

    #[test]
    fn credential_suffix_match_privileged() {
        let policy = ExpertPolicy::default();
        let d = policy.decide(true, "staff.gmail.com", VerificationMode::Credential);
        assert!(d.privileged);
        assert!(policy.decide(true, "mit.edu", VerificationMode::Credential).privileged);
    }

    #[test]
    fn unverified_never_privileged() {
        let policy = ExpertPolicy::default();
        for domain in ["gmail.com", "staff.gmail.com", "mit.edu", "example.com"] {
            let d = policy.decide(false, domain, VerificationMode::Credential);
            assert!(!d.verified);
            assert!(!d.privileged, "{domain} must not be privileged unverified");
        }
    }

    #[test]
    fn label_boundary_required() {
        let policy = ExpertPolicy::default();
        assert!(!policy.is_expert_domain("notgmail.com"));
        assert!(!policy.is_expert_domain("credu"));
        assert!(policy.is_expert_domain("gmail.com"));
    }

    #[test]
    fn case_insensitive() {
        let policy = ExpertPolicy::new(["Example.ORG"]);
        assert!(policy.is_expert_domain("team.example.org"));
        assert!(policy.is_expert_domain("EXAMPLE.org"));
    }

    #[test]
    fn entries_normalized() {
        let policy = ExpertPolicy::new([" .edu ", "", "GMAIL.com"]);
        assert_eq!(policy.domains(), &["edu".to_string(), "gmail.com".to_string()]);
    }

    #[test]
    fn non_listed_domain_not_privileged() {
        let policy = ExpertPolicy::default();
        let d = policy.decide(true, "example.com", VerificationMode::Credential);
        assert!(d.verified);
        assert!(!d.privileged);
    }
}

//! Run fingerprint.
//!
//! Identifies a generated test set by what it was generated from, so two
//! runs over an unchanged story yield the same fingerprint.

use sha2::{Digest, Sha256};

use crate::domain::Criteria;

/// Hex characters kept from the SHA-256 digest.
pub const FINGERPRINT_LEN: usize = 12;

/// Fingerprint over (summary, criteria texts, project key).
pub fn fingerprint(summary: &str, criteria: &Criteria, project_key: &str) -> String {
    let mut hasher = Sha256::new();

    // Components are NUL-separated and tagged so that moving text between
    // them changes the digest.
    hasher.update(b"S:");
    hasher.update(summary.as_bytes());
    hasher.update(b"\0");
    for criterion in criteria {
        hasher.update(b"C:");
        hasher.update(criterion.text.as_bytes());
        hasher.update(b"\0");
    }
    hasher.update(b"P:");
    hasher.update(project_key.as_bytes());

    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

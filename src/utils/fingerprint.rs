//! Prompt fingerprints for audit logging.
//!
//! The fingerprint depends **only** on the prompt bytes, so identical
//! requests can be correlated across log lines and runs.

use sha2::{Digest, Sha256};

use crate::utils::constants::FINGERPRINT_LOG_PREFIX_LEN;

/// Hex-encoded SHA-256 of `body`
pub fn fingerprint(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

/// Leading characters of a fingerprint, as shown in logs
pub fn short_fingerprint(fingerprint: &str) -> &str {
    let end = fingerprint.len().min(FINGERPRINT_LOG_PREFIX_LEN);
    &fingerprint[..end]
}

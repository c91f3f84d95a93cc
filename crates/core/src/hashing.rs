//! SHA-256 digests used to namespace cache files per network endpoint.

use sha2::{Digest, Sha256};

/// Number of hex characters kept from the endpoint digest.
pub const FINGERPRINT_LEN: usize = 8;

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Short, stable fingerprint of a network endpoint.
pub fn fingerprint(endpoint: &str) -> String {
    let mut digest = sha256_hex(endpoint.as_bytes());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

//! Query text fingerprinting.
//!
//! A stored fingerprint that matches the current query text means the text
//! has not changed since the last successful run and execution can be
//! skipped. The digest only needs to be stable and collision-resistant for
//! change detection; it carries no security guarantee.

use sha2::{Digest, Sha256};

/// Computes the fingerprint of a query text: SHA-256 over the UTF-8 bytes,
/// rendered as lowercase hex.
pub fn fingerprint(sql: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sql.as_bytes());
    hex::encode(hasher.finalize())
}

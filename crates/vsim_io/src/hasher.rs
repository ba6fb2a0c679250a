//! crates/vsim_io/src/hasher.rs
//!
//! SHA-256 digests, lowercase hex.
//! - `sha256_canonical(..)` for values/structs (goes through canonical JSON)
//! - `sha256_hex(..)` for raw bytes

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_bytes;
use crate::IoError;

pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over the canonical JSON bytes of `value`.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

/// Lowercase 64-hex check for stored digests.
pub fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f'))
}

//! crates/vsim_io/src/lib.rs
//! I/O for the election simulator.
//!
//! - `snapshot`: the persisted election schema (people, results, duels, settings)
//! - `validate`: structural checks on a snapshot before anything mutates
//! - `canonical_json`: sorted-key compact JSON + atomic file writes
//! - `hasher`: SHA-256 digests over raw or canonical bytes
//! - `loader`: params / snapshot files in and out

#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (read, create_dir_all, rename, fsync).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON (de)serialization errors with a pointer-like location.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Stored digest does not match the recomputed one.
    #[error("digest mismatch: stored {stored}, computed {computed}")]
    DigestMismatch { stored: String, computed: String },

    /// Domain / invariant violation in a loaded artifact.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json only knows line/column; report that as the location.
        IoError::Json { pointer: format!("line {} column {}", e.line(), e.column()), msg: e.to_string() }
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;
pub mod snapshot;
pub mod validate;

pub mod prelude {
    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::hasher::{sha256_canonical, sha256_hex};
    pub use crate::loader::{load_params, load_snapshot, write_snapshot};
    pub use crate::snapshot::ElectionSnapshot;
    pub use crate::validate::{validate_snapshot, ValidationReport};
    pub use crate::{IoError, IoResult};
}

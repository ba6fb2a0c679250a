//! Loader: params and snapshot files in, sealed snapshots out. Local files only.

use std::fs;
use std::path::Path;

use vsim_core::variables::SimParams;

use crate::canonical_json::write_canonical_file;
use crate::snapshot::ElectionSnapshot;
use crate::IoError;

fn read_text(path: &Path) -> Result<String, IoError> {
    fs::read_to_string(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))
}

/// Read a params JSON file; absent fields take their defaults. Domains are checked.
pub fn load_params(path: &Path) -> Result<SimParams, IoError> {
    let params: SimParams = serde_json::from_str(&read_text(path)?)?;
    params
        .validate_domains()
        .map_err(|e| IoError::Invalid(format!("{}: {e}", path.display())))?;
    tracing::debug!(path = %path.display(), "params loaded");
    Ok(params)
}

/// Read a snapshot and verify its digest when one is stored.
///
/// Content checks are separate (`validate::validate_snapshot`) so callers can
/// report every issue at once.
pub fn load_snapshot(path: &Path) -> Result<ElectionSnapshot, IoError> {
    let snapshot: ElectionSnapshot = serde_json::from_str(&read_text(path)?)?;
    snapshot.verify_digest()?;
    tracing::info!(
        path = %path.display(),
        candidates = snapshot.candidates.len(),
        electors = snapshot.electors.len(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

/// Seal (sort rows + digest) and write canonically. Returns the digest.
pub fn write_snapshot(path: &Path, snapshot: &ElectionSnapshot) -> Result<String, IoError> {
    let mut sealed = snapshot.clone();
    sealed.seal()?;
    write_canonical_file(path, &sealed)?;
    let digest = sealed.digest.unwrap_or_default();
    tracing::info!(path = %path.display(), %digest, "snapshot written");
    Ok(digest)
}

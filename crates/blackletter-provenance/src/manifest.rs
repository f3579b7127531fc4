//! Audit manifest: the provenance inputs of the latest stamping run.
//!
//! Only the latest snapshot is kept; each run overwrites the file.

use crate::error::{ProvenanceError, Result};
use crate::fs::{to_pretty_json, write_file_atomic};
use crate::hash::{compute_ruleset_hash, RulesetFingerprint};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Run timestamp; equals `metadata.timestamp` of every finding in the run.
    pub generated_at: String,
    pub engine_version: String,
    pub ruleset_hash: RulesetFingerprint,
}

/// Write `manifest` to `path`, creating parent directories.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<()> {
    let bytes = to_pretty_json(manifest, "manifest")?;
    write_file_atomic(path, &bytes)
}

pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let bytes = std::fs::read(path).map_err(|e| ProvenanceError::read(path, e))?;
    serde_json::from_slice(&bytes).map_err(|source| ProvenanceError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Stored manifest compared with the current state of the rules directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestCheck {
    pub manifest: Manifest,
    pub current_hash: RulesetFingerprint,
    pub matches: bool,
}

/// Recompute the ruleset hash and compare it with the stored manifest.
pub fn verify_manifest(manifest_path: &Path, rules_dir: &Path) -> Result<ManifestCheck> {
    let manifest = read_manifest(manifest_path)?;
    let current_hash = compute_ruleset_hash(rules_dir)?;
    let matches = manifest.ruleset_hash == current_hash;
    if !matches {
        tracing::warn!(
            recorded = %manifest.ruleset_hash,
            current = %current_hash,
            "ruleset changed since manifest was written"
        );
    }
    Ok(ManifestCheck {
        manifest,
        current_hash,
        matches,
    })
}

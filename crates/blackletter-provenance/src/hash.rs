//! Ruleset fingerprinting.
//!
//! `sha256(bytes(file_1) || bytes(file_2) || ...)` over every rule file in
//! relative-path order. Raw bytes, not parsed content: any edit, including
//! whitespace, changes the fingerprint.

use crate::error::{ProvenanceError, Result};
use crate::rules::discover_rule_files;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Hex-encoded SHA-256 over the rule files of one run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RulesetFingerprint(String);

impl RulesetFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for RulesetFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RulesetFingerprint {
    fn from(s: String) -> Self {
        RulesetFingerprint(s)
    }
}

/// Fingerprint of every rule file under `root`.
pub fn compute_ruleset_hash(root: &Path) -> Result<RulesetFingerprint> {
    let files = discover_rule_files(root)?;
    let fingerprint = digest_files(&files)?;
    tracing::debug!(files = files.len(), ruleset_hash = %fingerprint, "computed ruleset hash");
    Ok(fingerprint)
}

/// Fingerprint of an explicit file set. Input order does not matter.
pub fn hash_rule_files(files: &[PathBuf]) -> Result<RulesetFingerprint> {
    let mut sorted = files.to_vec();
    sorted.sort_by_cached_key(|p| p.to_string_lossy().replace('\\', "/"));
    digest_files(&sorted)
}

fn digest_files(files: &[PathBuf]) -> Result<RulesetFingerprint> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    for path in files {
        let mut f = std::fs::File::open(path).map_err(|e| ProvenanceError::read(path, e))?;
        loop {
            let n = f.read(&mut buf).map_err(|e| ProvenanceError::read(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
    }
    Ok(RulesetFingerprint(hex::encode(hasher.finalize())))
}

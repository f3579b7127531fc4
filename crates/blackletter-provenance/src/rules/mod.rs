//! Rule metadata loading.
//!
//! Scans a rules directory for YAML definitions and builds the id → metadata
//! table used when stamping findings.
//!
//! Tolerance policy:
//! - a file without an `id` does not contribute an entry (silent)
//! - a file that is not valid YAML, or not valid UTF-8, is skipped with a warning
//!   and recorded in [`RuleTable::skipped`]
//! - an unreadable directory or file is fatal
//! - duplicate ids: the last file in path order wins

pub mod check;
mod discover;
mod document;

pub use check::{check_rules_dir, IssueLevel, RuleCheckReport, RuleIssue};
pub use discover::{discover_rule_files, RULE_FILE_SUFFIXES};

use crate::error::{ProvenanceError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Version label used when a rule (or a finding's rule) has none.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Descriptive facts about one compliance rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub id: String,
    /// `source.version_label` (or `version`), else `"unknown"`.
    pub version: String,
    /// Rule title; empty when the file has none.
    pub text: String,
}

/// A rule file that was found but could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRuleFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Rule metadata keyed by rule id.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: BTreeMap<String, RuleMetadata>,
    skipped: Vec<SkippedRuleFile>,
}

impl RuleTable {
    pub fn get(&self, rule_id: &str) -> Option<&RuleMetadata> {
        self.rules.get(rule_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in id order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleMetadata> {
        self.rules.values()
    }

    /// Files skipped because they could not be parsed.
    pub fn skipped(&self) -> &[SkippedRuleFile] {
        &self.skipped
    }

    pub fn insert(&mut self, rule: RuleMetadata) -> Option<RuleMetadata> {
        self.rules.insert(rule.id.clone(), rule)
    }
}

impl FromIterator<RuleMetadata> for RuleTable {
    fn from_iter<I: IntoIterator<Item = RuleMetadata>>(iter: I) -> Self {
        let mut table = RuleTable::default();
        for rule in iter {
            table.insert(rule);
        }
        table
    }
}

/// Load rule metadata from every rule file under `root`.
pub fn load_rule_metadata(root: &Path) -> Result<RuleTable> {
    let files = discover_rule_files(root)?;
    let mut table = RuleTable::default();

    for path in files {
        let bytes = std::fs::read(&path).map_err(|e| ProvenanceError::read(&path, e))?;
        let parsed = String::from_utf8(bytes)
            .map_err(|e| format!("not valid UTF-8: {}", e))
            .and_then(|content| document::parse_rule_document(&content));

        let doc = match parsed {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                tracing::debug!(path = %path.display(), "rule file has no mapping, skipping");
                continue;
            }
            Err(reason) => {
                tracing::warn!(path = %path.display(), %reason, "skipping malformed rule file");
                table.skipped.push(SkippedRuleFile { path, reason });
                continue;
            }
        };

        let Some(id) = doc.id() else {
            tracing::debug!(path = %path.display(), "rule file has no id, skipping");
            continue;
        };

        let rule = RuleMetadata {
            version: doc
                .version_label()
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            text: doc.title().unwrap_or_default(),
            id,
        };
        if let Some(previous) = table.insert(rule) {
            tracing::debug!(
                rule_id = %previous.id,
                path = %path.display(),
                "duplicate rule id, later file wins"
            );
        }
    }

    tracing::debug!(count = table.len(), "loaded rule metadata");
    Ok(table)
}

//! Finding stamping.
//!
//! Joins raw findings against the rule table and attaches provenance
//! metadata. Stamping itself is pure; reading and writing the findings file
//! are separate functions so the pipeline controls when anything hits disk.

use crate::clock::{format_timestamp, Clock};
use crate::error::{ProvenanceError, Result};
use crate::fs::{to_pretty_json, write_file_atomic};
use crate::hash::RulesetFingerprint;
use crate::rules::{RuleTable, UNKNOWN_VERSION};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::path::Path;

/// Keys owned by the stamper. Stale copies are dropped before re-stamping.
const STAMP_FIELDS: &[&str] = &["rule_text", "evidence_snippet", "metadata"];

/// Where in a source document a finding was observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source_file: String,
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub snippet: String,
    /// Locator fields beyond the above (offsets, bounding boxes); kept as is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A compliance determination as produced by the rule-evaluation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFinding {
    pub rule_id: String,
    pub evidence: Evidence,
    /// Any other fields; carried through stamping untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawFinding {
    pub fn new(rule_id: impl Into<String>, evidence: Evidence) -> Self {
        Self {
            rule_id: rule_id.into(),
            evidence,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingMetadata {
    pub rule_version: String,
    pub ruleset_hash: RulesetFingerprint,
    pub engine_version: String,
    pub source_file: String,
    pub page: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub timestamp: String,
}

/// A raw finding enriched with rule text and provenance metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StampedFinding {
    pub rule_id: String,
    pub evidence: Evidence,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub rule_text: String,
    pub evidence_snippet: String,
    pub metadata: FindingMetadata,
}

/// Inputs shared by every finding of one stamping run.
#[derive(Debug, Clone, PartialEq)]
pub struct StampContext {
    pub ruleset_hash: RulesetFingerprint,
    pub engine_version: String,
    /// RFC3339 UTC, read once per run.
    pub timestamp: String,
}

impl StampContext {
    /// Reads `clock` exactly once.
    pub fn new(
        ruleset_hash: RulesetFingerprint,
        engine_version: impl Into<String>,
        clock: &dyn Clock,
    ) -> Self {
        Self {
            ruleset_hash,
            engine_version: engine_version.into(),
            timestamp: format_timestamp(clock.now()),
        }
    }
}

/// Result of stamping a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct StampOutcome {
    /// One entry per input finding, in input order.
    pub findings: Vec<StampedFinding>,
    /// Rule ids referenced by findings but absent from the rule table.
    pub unmatched_rule_ids: BTreeSet<String>,
}

/// Stamp every finding in `raw`.
///
/// Unknown rule ids degrade to empty text and version `"unknown"`; they are
/// collected in [`StampOutcome::unmatched_rule_ids`] and never drop a finding.
pub fn stamp_findings(raw: Vec<RawFinding>, rules: &RuleTable, ctx: &StampContext) -> StampOutcome {
    let mut unmatched_rule_ids = BTreeSet::new();
    let findings = raw
        .into_iter()
        .map(|f| {
            let rule = rules.get(&f.rule_id);
            if rule.is_none() {
                unmatched_rule_ids.insert(f.rule_id.clone());
            }
            stamp_one(f, rule.map(|r| (r.text.as_str(), r.version.as_str())), ctx)
        })
        .collect();

    for rule_id in &unmatched_rule_ids {
        tracing::warn!(rule_id = %rule_id, "finding references unknown rule");
    }

    StampOutcome {
        findings,
        unmatched_rule_ids,
    }
}

fn stamp_one(f: RawFinding, rule: Option<(&str, &str)>, ctx: &StampContext) -> StampedFinding {
    let RawFinding {
        rule_id,
        evidence,
        mut extra,
    } = f;
    for key in STAMP_FIELDS {
        extra.remove(*key);
    }

    let (rule_text, rule_version) = rule.unwrap_or(("", UNKNOWN_VERSION));
    let metadata = FindingMetadata {
        rule_version: rule_version.to_string(),
        ruleset_hash: ctx.ruleset_hash.clone(),
        engine_version: ctx.engine_version.clone(),
        source_file: evidence.source_file.clone(),
        page: evidence.page,
        section: evidence.section.clone(),
        timestamp: ctx.timestamp.clone(),
    };

    StampedFinding {
        rule_id,
        evidence_snippet: evidence.snippet.clone(),
        evidence,
        extra,
        rule_text: rule_text.to_string(),
        metadata,
    }
}

/// Read a JSON array of raw findings.
///
/// A missing file is [`ProvenanceError::MissingFindings`]: the upstream
/// evaluation step has to run first.
pub fn read_findings(path: &Path) -> Result<Vec<RawFinding>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ProvenanceError::MissingFindings {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(ProvenanceError::read(path, e)),
    };
    serde_json::from_slice(&bytes).map_err(|source| ProvenanceError::FindingsParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrite `path` with the stamped findings (pretty JSON).
pub fn write_findings(path: &Path, findings: &[StampedFinding]) -> Result<()> {
    let bytes = to_pretty_json(findings, "stamped findings")?;
    write_file_atomic(path, &bytes)
}

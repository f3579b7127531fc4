//! The stamping run:
//! `load metadata → hash ruleset → read findings → stamp → write findings → write manifest`.
//!
//! Both outputs are serialized and staged as temp files before either target
//! is replaced. A failure while staging leaves both targets untouched; only
//! the final pair of renames commits the run.

use crate::clock::Clock;
use crate::config::PipelineConfig;
use crate::error::{ProvenanceError, Result};
use crate::fs::{to_pretty_json, StagedFile};
use crate::hash::{compute_ruleset_hash, RulesetFingerprint};
use crate::manifest::Manifest;
use crate::rules::{load_rule_metadata, SkippedRuleFile};
use crate::stamp::{read_findings, stamp_findings, StampContext};
use serde::Serialize;
use std::path::PathBuf;

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub findings_path: PathBuf,
    pub manifest_path: PathBuf,
    pub finding_count: usize,
    pub rule_count: usize,
    pub ruleset_hash: RulesetFingerprint,
    pub engine_version: String,
    pub generated_at: String,
    pub unmatched_rule_ids: Vec<String>,
    pub skipped_rule_files: Vec<SkippedRuleFile>,
}

pub fn run(config: &PipelineConfig, clock: &dyn Clock) -> Result<PipelineReport> {
    if let Err(e) = std::fs::metadata(&config.findings_path) {
        if e.kind() == std::io::ErrorKind::NotFound {
            return Err(ProvenanceError::MissingFindings {
                path: config.findings_path.clone(),
            });
        }
        return Err(ProvenanceError::read(&config.findings_path, e));
    }

    let rules = load_rule_metadata(&config.rules_dir)?;
    let ruleset_hash = compute_ruleset_hash(&config.rules_dir)?;
    tracing::info!(
        rules = rules.len(),
        ruleset_hash = %ruleset_hash,
        "loaded ruleset"
    );

    let raw = read_findings(&config.findings_path)?;
    let ctx = StampContext::new(ruleset_hash, config.engine_version.clone(), clock);
    let outcome = stamp_findings(raw, &rules, &ctx);

    let manifest = Manifest {
        generated_at: ctx.timestamp.clone(),
        engine_version: ctx.engine_version.clone(),
        ruleset_hash: ctx.ruleset_hash.clone(),
    };

    let findings_bytes = to_pretty_json(&outcome.findings, "stamped findings")?;
    let manifest_bytes = to_pretty_json(&manifest, "manifest")?;

    let staged_findings = StagedFile::stage(&config.findings_path, &findings_bytes)?;
    let staged_manifest = StagedFile::stage(&config.manifest_path, &manifest_bytes)?;
    staged_findings.commit()?;
    staged_manifest.commit()?;

    tracing::info!(
        count = outcome.findings.len(),
        unmatched = outcome.unmatched_rule_ids.len(),
        path = %config.findings_path.display(),
        "findings stamped"
    );

    Ok(PipelineReport {
        findings_path: config.findings_path.clone(),
        manifest_path: config.manifest_path.clone(),
        finding_count: outcome.findings.len(),
        rule_count: rules.len(),
        ruleset_hash: ctx.ruleset_hash,
        engine_version: ctx.engine_version,
        generated_at: ctx.timestamp,
        unmatched_rule_ids: outcome.unmatched_rule_ids.into_iter().collect(),
        skipped_rule_files: rules.skipped().to_vec(),
    })
}

//! End-to-end stamping runs against a temporary repository layout.

use blackletter_provenance::{
    compute_ruleset_hash, read_manifest, run_pipeline, FixedClock, PipelineConfig,
    ProvenanceError, StampedFinding, UNKNOWN_VERSION,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

const GDPR_RULE: &str = r#"id: gdpr-dpa-1
version: "1.0.0"
title: "DPA clause present"
"#;

const AML_RULE: &str = r#"id: aml-kyc-1
version: "1.0.0"
"#;

fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 8, 1, 9, 30, 0).unwrap())
}

fn setup_repo(root: &Path, findings: &Value) -> PipelineConfig {
    let rules = root.join("rules");
    fs::create_dir_all(&rules).unwrap();
    fs::write(rules.join("gdpr-dpa-1.yaml"), GDPR_RULE).unwrap();
    fs::write(rules.join("aml-kyc-1.yaml"), AML_RULE).unwrap();

    let cfg = PipelineConfig::with_root(root).engine_version("2.4.0");
    fs::create_dir_all(cfg.findings_path.parent().unwrap()).unwrap();
    fs::write(
        &cfg.findings_path,
        serde_json::to_vec_pretty(findings).unwrap(),
    )
    .unwrap();
    cfg
}

fn scenario_findings() -> Value {
    json!([
        {"rule_id": "gdpr-dpa-1", "evidence": {"source_file": "a.pdf", "page": 2, "snippet": "the processor shall..."}},
        {"rule_id": "unknown-rule", "evidence": {"source_file": "a.pdf", "page": 3, "snippet": "..."}}
    ])
}

fn read_stamped(path: &Path) -> Vec<StampedFinding> {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn test_two_rule_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = setup_repo(dir.path(), &scenario_findings());

    let report = run_pipeline(&cfg, &clock()).unwrap();
    assert_eq!(report.finding_count, 2);
    assert_eq!(report.rule_count, 2);
    assert_eq!(report.unmatched_rule_ids, vec!["unknown-rule".to_string()]);

    let stamped = read_stamped(&cfg.findings_path);
    assert_eq!(stamped[0].rule_text, "DPA clause present");
    assert_eq!(stamped[0].metadata.rule_version, "1.0.0");
    assert_eq!(stamped[0].evidence_snippet, "the processor shall...");
    assert_eq!(stamped[1].rule_text, "");
    assert_eq!(stamped[1].metadata.rule_version, UNKNOWN_VERSION);

    assert_eq!(stamped[0].metadata.ruleset_hash, stamped[1].metadata.ruleset_hash);
    assert_eq!(stamped[0].metadata.timestamp, stamped[1].metadata.timestamp);
    assert_eq!(stamped[0].metadata.timestamp, "2025-08-01T09:30:00.000Z");
    assert_eq!(stamped[0].metadata.engine_version, "2.4.0");
}

#[test]
fn test_manifest_matches_every_finding() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = setup_repo(dir.path(), &scenario_findings());

    run_pipeline(&cfg, &clock()).unwrap();

    let manifest = read_manifest(&cfg.manifest_path).unwrap();
    let expected_hash = compute_ruleset_hash(&cfg.rules_dir).unwrap();
    assert_eq!(manifest.ruleset_hash, expected_hash);
    assert_eq!(manifest.engine_version, "2.4.0");

    for f in read_stamped(&cfg.findings_path) {
        assert_eq!(f.metadata.ruleset_hash, manifest.ruleset_hash);
        assert_eq!(f.metadata.timestamp, manifest.generated_at);
    }
}

#[test]
fn test_restamp_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = setup_repo(dir.path(), &scenario_findings());

    run_pipeline(&cfg, &clock()).unwrap();
    let first = fs::read(&cfg.findings_path).unwrap();

    run_pipeline(&cfg, &clock()).unwrap();
    let second = fs::read(&cfg.findings_path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_restamp_recomputes_after_rule_change() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = setup_repo(dir.path(), &scenario_findings());
    run_pipeline(&cfg, &clock()).unwrap();
    let before = read_stamped(&cfg.findings_path);

    fs::write(
        cfg.rules_dir.join("gdpr-dpa-1.yaml"),
        "id: gdpr-dpa-1\nversion: \"1.1.0\"\ntitle: \"DPA clause present (Art. 28)\"\n",
    )
    .unwrap();
    run_pipeline(&cfg, &clock()).unwrap();
    let after = read_stamped(&cfg.findings_path);

    assert_eq!(after.len(), 2);
    assert_eq!(after[0].metadata.rule_version, "1.1.0");
    assert_eq!(after[0].rule_text, "DPA clause present (Art. 28)");
    assert_ne!(before[0].metadata.ruleset_hash, after[0].metadata.ruleset_hash);
}

#[test]
fn test_extra_finding_fields_are_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let findings = json!([
        {"rule_id": "gdpr-dpa-1", "severity": "high", "evidence": {"source_file": "a.pdf", "page": 1, "section": "4.2", "snippet": "x"}}
    ]);
    let cfg = setup_repo(dir.path(), &findings);

    run_pipeline(&cfg, &clock()).unwrap();

    let v: Value = serde_json::from_slice(&fs::read(&cfg.findings_path).unwrap()).unwrap();
    assert_eq!(v[0]["severity"], "high");
    assert_eq!(v[0]["metadata"]["section"], "4.2");
    assert_eq!(v[0]["evidence"]["section"], "4.2");
}

#[test]
fn test_missing_findings_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = setup_repo(dir.path(), &scenario_findings());
    fs::remove_file(&cfg.findings_path).unwrap();

    let err = run_pipeline(&cfg, &clock()).unwrap_err();
    assert!(err.is_missing_input());
    assert!(!cfg.findings_path.exists());
    assert!(!cfg.manifest_path.exists());
}

#[test]
fn test_unparseable_findings_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = setup_repo(dir.path(), &scenario_findings());
    fs::write(&cfg.findings_path, "[{\"rule_id\": 1}]").unwrap();

    let err = run_pipeline(&cfg, &clock()).unwrap_err();
    assert!(matches!(err, ProvenanceError::FindingsParse { .. }));
    assert_eq!(
        fs::read_to_string(&cfg.findings_path).unwrap(),
        "[{\"rule_id\": 1}]"
    );
    assert!(!cfg.manifest_path.exists());
}

#[test]
fn test_missing_rules_dir_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = setup_repo(dir.path(), &scenario_findings());
    fs::remove_dir_all(&cfg.rules_dir).unwrap();

    let err = run_pipeline(&cfg, &clock()).unwrap_err();
    assert!(matches!(err, ProvenanceError::RulesDir { .. }));
    assert!(!cfg.manifest_path.exists());
}

#[test]
fn test_malformed_rule_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = setup_repo(dir.path(), &scenario_findings());
    fs::write(cfg.rules_dir.join("broken.yaml"), "id: [oops\n").unwrap();

    let report = run_pipeline(&cfg, &clock()).unwrap();
    assert_eq!(report.rule_count, 2);
    assert_eq!(report.skipped_rule_files.len(), 1);
    // The broken file still counts towards the fingerprint.
    assert_eq!(
        report.ruleset_hash,
        compute_ruleset_hash(&cfg.rules_dir).unwrap()
    );
}

#[test]
fn test_empty_batch() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = setup_repo(dir.path(), &json!([]));

    let report = run_pipeline(&cfg, &clock()).unwrap();
    assert_eq!(report.finding_count, 0);
    assert!(read_stamped(&cfg.findings_path).is_empty());
    assert!(cfg.manifest_path.exists());
}

#[test]
fn test_blocked_manifest_dir_leaves_findings_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = setup_repo(dir.path(), &scenario_findings());
    let before = fs::read(&cfg.findings_path).unwrap();
    // A plain file where the manifest's parent directory should be.
    fs::write(dir.path().join("assurance"), "not a directory").unwrap();

    let err = run_pipeline(&cfg, &clock()).unwrap_err();
    assert!(matches!(err, ProvenanceError::Write { .. }));
    assert_eq!(fs::read(&cfg.findings_path).unwrap(), before);

    let leftovers: Vec<_> = fs::read_dir(cfg.findings_path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_evidence_extra_fields_survive_restamp() {
    let dir = tempfile::tempdir().unwrap();
    let findings = json!([
        {"rule_id": "gdpr-dpa-1", "evidence": {"source_file": "a.pdf", "page": 2, "snippet": "x", "bbox": [1, 2, 3, 4], "char_start": 10}}
    ]);
    let cfg = setup_repo(dir.path(), &findings);

    run_pipeline(&cfg, &clock()).unwrap();
    run_pipeline(&cfg, &clock()).unwrap();

    let v: Value = serde_json::from_slice(&fs::read(&cfg.findings_path).unwrap()).unwrap();
    assert_eq!(v[0]["evidence"]["bbox"], json!([1, 2, 3, 4]));
    assert_eq!(v[0]["evidence"]["char_start"], 10);
    assert!(v[0]["metadata"].get("bbox").is_none());
}

#[test]
fn test_rule_with_structured_patterns_still_stamps() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = setup_repo(dir.path(), &scenario_findings());
    fs::write(
        cfg.rules_dir.join("gdpr-dpa-1.yaml"),
        "id: gdpr-dpa-1\nversion: '1.0.0'\ntitle: DPA\nsource: EUR-Lex\npatterns:\n  - regex: processor\n",
    )
    .unwrap();

    let report = run_pipeline(&cfg, &clock()).unwrap();
    assert!(report.skipped_rule_files.is_empty());

    let stamped = read_stamped(&cfg.findings_path);
    assert_eq!(stamped[0].rule_text, "DPA");
    assert_eq!(stamped[0].metadata.rule_version, "1.0.0");
}

//! Provenance stamping for compliance findings.
//!
//! A stamping run loads rule metadata from a rules directory, fingerprints the
//! directory's raw bytes, enriches every finding with rule text, rule version,
//! ruleset hash, engine version and one shared timestamp, then writes an audit
//! manifest recording the same hash and time.

pub mod assurance;
pub mod clock;
pub mod config;
pub mod error;
pub mod fs;
pub mod hash;
pub mod manifest;
pub mod pipeline;
pub mod rules;
pub mod stamp;
pub mod status;

// Convenience re-exports
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigFile, PipelineConfig};
pub use error::{ProvenanceError, Result};
pub use hash::{compute_ruleset_hash, hash_rule_files, RulesetFingerprint};
pub use manifest::{read_manifest, verify_manifest, write_manifest, Manifest, ManifestCheck};
pub use pipeline::{run as run_pipeline, PipelineReport};
pub use rules::{
    check_rules_dir, discover_rule_files, load_rule_metadata, RuleCheckReport, RuleMetadata,
    RuleTable, SkippedRuleFile, UNKNOWN_VERSION,
};
pub use stamp::{
    read_findings, stamp_findings, write_findings, Evidence, FindingMetadata, RawFinding,
    StampContext, StampOutcome, StampedFinding,
};
pub use status::{write_status, StatusRecord};

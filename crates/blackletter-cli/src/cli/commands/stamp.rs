use super::print_json;
use crate::cli::args::{OutputFormat, StampArgs};
use crate::exit_codes::{MISSING_INPUT, SUCCESS, UNMATCHED_RULES};
use anyhow::{Context, Result};
use blackletter_provenance::{run_pipeline, ConfigFile, SystemClock};

pub fn run(args: StampArgs, config: &ConfigFile) -> Result<i32> {
    let cfg = crate::cli::config::pipeline(
        config,
        args.rules.rules_dir,
        args.findings,
        args.manifest,
        args.engine_version,
    );

    let report = match run_pipeline(&cfg, &SystemClock) {
        Ok(r) => r,
        Err(e) if e.is_missing_input() => {
            eprintln!("{e}");
            eprintln!("Run the rule evaluation step first, then re-run `blackletter stamp`.");
            return Ok(MISSING_INPUT);
        }
        Err(e) => return Err(e).context("stamping failed"),
    };

    match args.output.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            eprintln!("Findings stamped with provenance metadata.");
            eprintln!("  findings:      {} ({})", report.findings_path.display(), report.finding_count);
            eprintln!("  manifest:      {}", report.manifest_path.display());
            eprintln!("  rules:         {}", report.rule_count);
            eprintln!("  ruleset_hash:  {}", report.ruleset_hash);
            eprintln!("  engine:        {}", report.engine_version);
            eprintln!("  generated_at:  {}", report.generated_at);
            for skipped in &report.skipped_rule_files {
                eprintln!("  skipped rule file {}: {}", skipped.path.display(), skipped.reason);
            }
            if !report.unmatched_rule_ids.is_empty() {
                eprintln!(
                    "  unmatched rule ids: {}",
                    report.unmatched_rule_ids.join(", ")
                );
            }
        }
    }

    if args.strict && !report.unmatched_rule_ids.is_empty() {
        return Ok(UNMATCHED_RULES);
    }
    Ok(SUCCESS)
}

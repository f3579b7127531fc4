use super::print_json;
use crate::cli::args::{OutputFormat, RulesArgs, RulesCheckArgs, RulesCommand, RulesListArgs};
use crate::exit_codes::{RULE_CHECK_FAILED, SUCCESS};
use anyhow::{Context, Result};
use blackletter_provenance::{check_rules_dir, load_rule_metadata, ConfigFile, RuleMetadata};

pub fn run(args: RulesArgs, config: &ConfigFile) -> Result<i32> {
    match args.cmd {
        RulesCommand::List(a) => cmd_list(a, config),
        RulesCommand::Check(a) => cmd_check(a, config),
    }
}

fn cmd_list(args: RulesListArgs, config: &ConfigFile) -> Result<i32> {
    let rules_dir = args.rules.rules_dir.unwrap_or(config.pipeline().rules_dir);
    let table = load_rule_metadata(&rules_dir)
        .with_context(|| format!("failed to load rules from {}", rules_dir.display()))?;

    match args.output.format {
        OutputFormat::Json => {
            let rules: Vec<&RuleMetadata> = table.iter().collect();
            print_json(&serde_json::json!({
                "rules": rules,
                "skipped": table.skipped(),
            }))?;
        }
        OutputFormat::Text => {
            for r in table.iter() {
                println!("{}\t{}\t{}", r.id, r.version, r.text);
            }
            for s in table.skipped() {
                eprintln!("skipped {}: {}", s.path.display(), s.reason);
            }
        }
    }
    Ok(SUCCESS)
}

fn cmd_check(args: RulesCheckArgs, config: &ConfigFile) -> Result<i32> {
    let rules_dir = args.rules.rules_dir.unwrap_or(config.pipeline().rules_dir);
    let report = check_rules_dir(&rules_dir)
        .with_context(|| format!("failed to check rules in {}", rules_dir.display()))?;

    match args.output.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            for issue in report.errors.iter().chain(report.warnings.iter()) {
                match &issue.rule_id {
                    Some(id) => eprintln!("{}: {} [{}]: {}", issue.level, issue.file, id, issue.message),
                    None => eprintln!("{}: {}: {}", issue.level, issue.file, issue.message),
                }
            }
            eprintln!(
                "Checked {} files, {} rules: {} errors, {} warnings",
                report.files,
                report.rules,
                report.errors.len(),
                report.warnings.len()
            );
        }
    }

    let failed = !report.is_clean() || (args.deny_warnings && !report.warnings.is_empty());
    Ok(if failed { RULE_CHECK_FAILED } else { SUCCESS })
}

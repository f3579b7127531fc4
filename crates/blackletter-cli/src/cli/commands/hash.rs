use super::print_json;
use crate::cli::args::{HashArgs, OutputFormat};
use crate::exit_codes::SUCCESS;
use anyhow::{Context, Result};
use blackletter_provenance::{compute_ruleset_hash, discover_rule_files, ConfigFile};

pub fn run(args: HashArgs, config: &ConfigFile) -> Result<i32> {
    let rules_dir = args.rules.rules_dir.unwrap_or(config.pipeline().rules_dir);
    let files = discover_rule_files(&rules_dir)
        .with_context(|| format!("failed to scan {}", rules_dir.display()))?;
    let hash = compute_ruleset_hash(&rules_dir)
        .with_context(|| format!("failed to hash {}", rules_dir.display()))?;

    match args.output.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "ruleset_hash": hash,
            "files": files.len(),
        }))?,
        OutputFormat::Text => println!("{hash}"),
    }
    Ok(SUCCESS)
}

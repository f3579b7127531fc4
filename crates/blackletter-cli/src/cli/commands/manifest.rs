use super::print_json;
use crate::cli::args::{ManifestVerifyArgs, OutputFormat};
use crate::exit_codes::{RULE_CHECK_FAILED, SUCCESS};
use anyhow::{Context, Result};
use blackletter_provenance::{verify_manifest, ConfigFile};

pub fn cmd_verify(args: ManifestVerifyArgs, config: &ConfigFile) -> Result<i32> {
    let base = config.pipeline();
    let rules_dir = args.rules.rules_dir.unwrap_or(base.rules_dir);
    let manifest_path = args.manifest.unwrap_or(base.manifest_path);

    let check = verify_manifest(&manifest_path, &rules_dir).with_context(|| {
        format!("failed to verify manifest {}", manifest_path.display())
    })?;

    match args.output.format {
        OutputFormat::Json => print_json(&check)?,
        OutputFormat::Text => {
            if check.matches {
                eprintln!("Manifest verified ({}): OK", manifest_path.display());
            } else {
                eprintln!("Manifest out of date ({}):", manifest_path.display());
                eprintln!("  recorded: {}", check.manifest.ruleset_hash);
                eprintln!("  current:  {}", check.current_hash);
            }
            eprintln!("  generated_at: {}", check.manifest.generated_at);
            eprintln!("  engine:       {}", check.manifest.engine_version);
        }
    }
    Ok(if check.matches { SUCCESS } else { RULE_CHECK_FAILED })
}

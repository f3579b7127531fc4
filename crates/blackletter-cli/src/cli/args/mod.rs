use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod common;
pub mod rules;
pub use common::*;
pub use rules::*;

#[derive(Parser)]
#[command(
    name = "blackletter",
    version,
    about = "Provenance stamping for compliance findings: rule metadata, ruleset fingerprints, audit manifests"
)]
pub struct Cli {
    /// Config file (default: ./blackletter.yaml when present)
    #[arg(long, global = true, env = "BLACKLETTER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Stamp findings with rule text, versions and ruleset hash; write the audit manifest
    Stamp(StampArgs),
    /// Print the ruleset fingerprint
    Hash(HashArgs),
    /// Inspect or validate the rules directory
    Rules(RulesArgs),
    /// Audit manifest operations
    Manifest(ManifestArgs),
    /// Write status.json for the public status page
    Status(StatusArgs),
    /// Render the assurance card (JSON + Markdown) from evaluation metrics
    AssuranceCard(AssuranceCardArgs),
    /// Print the engine version
    Version,
}

#[derive(Args, Clone, Debug)]
pub struct StampArgs {
    #[command(flatten)]
    pub rules: RulesDirArg,

    /// Findings file (JSON array); overwritten in place with stamped findings
    #[arg(long, env = "BLACKLETTER_FINDINGS")]
    pub findings: Option<PathBuf>,

    /// Manifest output path
    #[arg(long, env = "BLACKLETTER_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Engine version recorded in every finding (default: this binary's version)
    #[arg(long, env = "BLACKLETTER_ENGINE_VERSION")]
    pub engine_version: Option<String>,

    /// Exit 4 when findings reference rule ids missing from the ruleset
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub output: FormatArg,
}

#[derive(Args, Clone, Debug)]
pub struct HashArgs {
    #[command(flatten)]
    pub rules: RulesDirArg,

    #[command(flatten)]
    pub output: FormatArg,
}

#[derive(Args, Clone, Debug)]
pub struct ManifestArgs {
    #[command(subcommand)]
    pub cmd: ManifestCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ManifestCommand {
    /// Compare the manifest's ruleset hash against the current rules directory
    Verify(ManifestVerifyArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ManifestVerifyArgs {
    #[command(flatten)]
    pub rules: RulesDirArg,

    /// Manifest path
    #[arg(long, env = "BLACKLETTER_MANIFEST")]
    pub manifest: Option<PathBuf>,

    #[command(flatten)]
    pub output: FormatArg,
}

#[derive(Args, Clone, Debug)]
pub struct StatusArgs {
    /// Output path (default: public/status.json)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Rule library version label
    #[arg(long)]
    pub library_version: Option<String>,

    /// Update SLA in days
    #[arg(long, env = "ASSURANCE_SLA_DAYS")]
    pub sla_days: Option<u32>,
}

#[derive(Args, Clone, Debug)]
pub struct AssuranceCardArgs {
    /// Evaluation metrics: JSON array of {task, precision, recall, sample_size}
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Artifacts directory (default: artifacts/)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Rule library version label
    #[arg(long)]
    pub library_version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stamp_flags() {
        let cli = Cli::try_parse_from([
            "blackletter",
            "stamp",
            "--rules-dir",
            "lib/rules",
            "--findings",
            "out/f.json",
            "--strict",
            "--format",
            "json",
        ])
        .unwrap();
        match cli.cmd {
            Command::Stamp(a) => {
                assert_eq!(a.rules.rules_dir, Some(PathBuf::from("lib/rules")));
                assert_eq!(a.findings, Some(PathBuf::from("out/f.json")));
                assert!(a.strict);
                assert_eq!(a.output.format, OutputFormat::Json);
            }
            _ => panic!("expected stamp"),
        }
    }

    #[test]
    fn test_every_subcommand_has_help_text() {
        let cmd = Cli::command();
        for sub in cmd.get_subcommands() {
            assert!(sub.get_about().is_some(), "{} has no help text", sub.get_name());
        }
    }

    #[test]
    fn test_rejects_non_numeric_sla_days() {
        assert!(Cli::try_parse_from(["blackletter", "status", "--sla-days", "ten"]).is_err());
    }
}

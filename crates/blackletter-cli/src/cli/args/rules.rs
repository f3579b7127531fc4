//! Rule directory command arguments.

use super::common::{FormatArg, RulesDirArg};
use clap::{Args, Subcommand};

#[derive(Args, Clone, Debug)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub cmd: RulesCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum RulesCommand {
    /// List rule metadata (id, version, title) as the stamper sees it
    List(RulesListArgs),

    /// Validate rule files: YAML syntax, ids, duplicates, regex patterns
    Check(RulesCheckArgs),
}

#[derive(Args, Clone, Debug)]
pub struct RulesListArgs {
    #[command(flatten)]
    pub rules: RulesDirArg,

    #[command(flatten)]
    pub output: FormatArg,
}

#[derive(Args, Clone, Debug)]
pub struct RulesCheckArgs {
    #[command(flatten)]
    pub rules: RulesDirArg,

    #[command(flatten)]
    pub output: FormatArg,

    /// Treat warnings (missing title/version) as errors
    #[arg(long)]
    pub deny_warnings: bool,
}

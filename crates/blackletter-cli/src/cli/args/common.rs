//! Shared argument types used across multiple commands.

use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args, Clone, Debug, Default)]
pub struct RulesDirArg {
    /// Directory of rule definition files (*.yml, *.yaml), scanned recursively
    #[arg(long, env = "BLACKLETTER_RULES_DIR")]
    pub rules_dir: Option<PathBuf>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct FormatArg {
    /// Output format: text (stderr) or json (stdout)
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

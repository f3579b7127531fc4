use super::args::*;

pub mod assurance;
pub mod hash;
pub mod manifest;
pub mod rules;
pub mod stamp;
pub mod status;

use crate::exit_codes::SUCCESS;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config = super::config::load(cli.config.as_deref())?;
    match cli.cmd {
        Command::Stamp(args) => stamp::run(args, &config),
        Command::Hash(args) => hash::run(args, &config),
        Command::Rules(args) => rules::run(args, &config),
        Command::Manifest(args) => match args.cmd {
            ManifestCommand::Verify(a) => manifest::cmd_verify(a, &config),
        },
        Command::Status(args) => status::run(args, &config),
        Command::AssuranceCard(args) => assurance::run(args, &config),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

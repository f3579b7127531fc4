use crate::cli::args::StatusArgs;
use crate::exit_codes::SUCCESS;
use anyhow::{Context, Result};
use blackletter_provenance::{write_status, ConfigFile, StatusRecord, SystemClock};

pub fn run(args: StatusArgs, config: &ConfigFile) -> Result<i32> {
    let path = args.out.unwrap_or_else(|| config.status_path());
    let record = StatusRecord::new(
        args.library_version
            .unwrap_or_else(|| config.library_version()),
        args.sla_days.unwrap_or_else(|| config.sla_days()),
        &SystemClock,
    );
    write_status(&path, &record)
        .with_context(|| format!("failed to write status {}", path.display()))?;
    eprintln!("Status written to {}", path.display());
    Ok(SUCCESS)
}

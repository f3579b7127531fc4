use crate::cli::args::AssuranceCardArgs;
use crate::exit_codes::SUCCESS;
use anyhow::{Context, Result};
use blackletter_provenance::assurance::{read_task_metrics, write_assurance_card, AssuranceCard};
use blackletter_provenance::{ConfigFile, SystemClock};

pub fn run(args: AssuranceCardArgs, config: &ConfigFile) -> Result<i32> {
    let metrics = read_task_metrics(&args.input)
        .with_context(|| format!("failed to read metrics {}", args.input.display()))?;
    let library_version = args
        .library_version
        .unwrap_or_else(|| config.library_version());
    let card = AssuranceCard::build(metrics, library_version, &SystemClock)?;

    let out_dir = args.out_dir.unwrap_or_else(|| config.artifacts_dir());
    let written = write_assurance_card(&out_dir, &card)
        .with_context(|| format!("failed to write assurance card to {}", out_dir.display()))?;

    eprintln!(
        "Assurance card artifacts written to {} ({} tasks)",
        out_dir.display(),
        card.tasks.len()
    );
    eprintln!("  {}", written.json_path.display());
    eprintln!("  {}", written.markdown_path.display());
    Ok(SUCCESS)
}

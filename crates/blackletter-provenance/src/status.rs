//! `status.json` for the public status page.

use crate::clock::{format_timestamp, Clock};
use crate::error::Result;
use crate::fs::{to_pretty_json, write_file_atomic};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_LIBRARY_VERSION: &str = "rules-lib@1.0.0";
pub const DEFAULT_SLA_DAYS: u32 = 10;
/// Placeholder until rolling SLA tracking exists.
pub const SLA_NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub library_version: String,
    pub last_update_iso: String,
    pub sla_days: u32,
    pub sla_met_rolling_90d: String,
}

impl StatusRecord {
    pub fn new(library_version: impl Into<String>, sla_days: u32, clock: &dyn Clock) -> Self {
        Self {
            library_version: library_version.into(),
            last_update_iso: format_timestamp(clock.now()),
            sla_days,
            sla_met_rolling_90d: SLA_NOT_AVAILABLE.to_string(),
        }
    }
}

pub fn write_status(path: &Path, record: &StatusRecord) -> Result<()> {
    let bytes = to_pretty_json(record, "status record")?;
    write_file_atomic(path, &bytes)?;
    tracing::info!(path = %path.display(), "status written");
    Ok(())
}

//! Config file discovery and flag precedence: flag/env > config file > defaults.

use anyhow::{Context, Result};
use blackletter_provenance::config::DEFAULT_CONFIG_FILE;
use blackletter_provenance::{ConfigFile, PipelineConfig};
use std::path::{Path, PathBuf};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load `explicit` if given, else `./blackletter.yaml` if it exists, else defaults.
pub fn load(explicit: Option<&Path>) -> Result<ConfigFile> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !p.exists() {
                return Ok(ConfigFile::default());
            }
            p
        }
    };
    tracing::debug!(path = %path.display(), "loading config");
    ConfigFile::load(&path).with_context(|| format!("failed to load config {}", path.display()))
}

/// Pipeline settings with command-line overrides applied.
pub fn pipeline(
    cfg: &ConfigFile,
    rules_dir: Option<PathBuf>,
    findings: Option<PathBuf>,
    manifest: Option<PathBuf>,
    engine_version: Option<String>,
) -> PipelineConfig {
    let base = cfg.pipeline();
    PipelineConfig {
        rules_dir: rules_dir.unwrap_or(base.rules_dir),
        findings_path: findings.unwrap_or(base.findings_path),
        manifest_path: manifest.unwrap_or(base.manifest_path),
        engine_version: engine_version
            .or_else(|| cfg.engine_version.clone())
            .unwrap_or_else(|| ENGINE_VERSION.to_string()),
    }
}

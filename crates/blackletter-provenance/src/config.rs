//! Pipeline configuration.
//!
//! Defaults match the repository layout (`rules/`, `out/findings.json`,
//! `assurance/manifest.json`). An optional `blackletter.yaml` overrides them;
//! relative paths in that file resolve against the file's own directory.

use crate::error::{ProvenanceError, Result};
use crate::status::{DEFAULT_LIBRARY_VERSION, DEFAULT_SLA_DAYS};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "blackletter.yaml";
pub const DEFAULT_RULES_DIR: &str = "rules";
pub const DEFAULT_FINDINGS_PATH: &str = "out/findings.json";
pub const DEFAULT_MANIFEST_PATH: &str = "assurance/manifest.json";
pub const DEFAULT_STATUS_PATH: &str = "public/status.json";
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Version of this crate; callers normally pass their own engine version.
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Paths and version for one stamping run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub rules_dir: PathBuf,
    pub findings_path: PathBuf,
    pub manifest_path: PathBuf,
    pub engine_version: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rules_dir: PathBuf::from(DEFAULT_RULES_DIR),
            findings_path: PathBuf::from(DEFAULT_FINDINGS_PATH),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            engine_version: CRATE_VERSION.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Defaults resolved against `root`.
    pub fn with_root(root: &Path) -> Self {
        Self {
            rules_dir: root.join(DEFAULT_RULES_DIR),
            findings_path: root.join(DEFAULT_FINDINGS_PATH),
            manifest_path: root.join(DEFAULT_MANIFEST_PATH),
            ..Default::default()
        }
    }

    pub fn engine_version(mut self, version: impl Into<String>) -> Self {
        self.engine_version = version.into();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusSection {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub library_version: Option<String>,
    #[serde(default)]
    pub sla_days: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssuranceSection {
    #[serde(default)]
    pub artifacts_dir: Option<PathBuf>,
}

/// Contents of `blackletter.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub rules_dir: Option<PathBuf>,
    #[serde(default)]
    pub findings: Option<PathBuf>,
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    #[serde(default)]
    pub engine_version: Option<String>,
    #[serde(default)]
    pub status: StatusSection,
    #[serde(default)]
    pub assurance: AssuranceSection,
}

impl ConfigFile {
    /// Load and resolve relative paths against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ProvenanceError::read(path, e))?;
        let mut cfg = Self::parse(&content).map_err(|e| match e {
            ProvenanceError::Config { message } => ProvenanceError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        cfg.resolve_paths(base);
        Ok(cfg)
    }

    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ProvenanceError::Config {
            message: e.to_string(),
        })
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut Option<PathBuf>| {
            if let Some(path) = p.as_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        };
        resolve(&mut self.rules_dir);
        resolve(&mut self.findings);
        resolve(&mut self.manifest);
        resolve(&mut self.status.path);
        resolve(&mut self.assurance.artifacts_dir);
    }

    /// Pipeline settings from this file on top of the defaults.
    pub fn pipeline(&self) -> PipelineConfig {
        let d = PipelineConfig::default();
        PipelineConfig {
            rules_dir: self.rules_dir.clone().unwrap_or(d.rules_dir),
            findings_path: self.findings.clone().unwrap_or(d.findings_path),
            manifest_path: self.manifest.clone().unwrap_or(d.manifest_path),
            engine_version: self.engine_version.clone().unwrap_or(d.engine_version),
        }
    }

    pub fn status_path(&self) -> PathBuf {
        self.status
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATUS_PATH))
    }

    pub fn library_version(&self) -> String {
        self.status
            .library_version
            .clone()
            .unwrap_or_else(|| DEFAULT_LIBRARY_VERSION.to_string())
    }

    pub fn sla_days(&self) -> u32 {
        self.status.sla_days.unwrap_or(DEFAULT_SLA_DAYS)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.assurance
            .artifacts_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR))
    }
}

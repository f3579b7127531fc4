use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the provenance pipeline.
///
/// Every variant is fatal for the invocation that produced it. Degraded
/// conditions (unknown rule ids, malformed rule files) never surface here;
/// they are reported through [`crate::StampOutcome`] and [`crate::RuleTable`].
#[derive(Debug, Error)]
pub enum ProvenanceError {
    #[error("Failed to read rules directory '{path}': {source}")]
    RulesDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Missing findings file at {path}")]
    MissingFindings { path: PathBuf },

    #[error("Failed to parse findings '{path}': {source}")]
    FindingsParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to parse manifest '{path}': {source}")]
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Invalid assurance input: {message}")]
    AssuranceInput { message: String },
}

impl ProvenanceError {
    /// True when the upstream findings file was never produced.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, ProvenanceError::MissingFindings { .. })
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProvenanceError::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProvenanceError::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = ProvenanceError> = std::result::Result<T, E>;

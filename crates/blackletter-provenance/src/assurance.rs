//! Assurance card: per-task precision/recall summary of the rule library.
//!
//! Input is a JSON array of `{task, precision, recall, sample_size}` produced
//! by an evaluation run. Output is `assurance_card.json` plus a markdown
//! rendering `ASSURANCE_CARD.md` in the artifacts directory.

use crate::clock::{format_timestamp, Clock};
use crate::error::{ProvenanceError, Result};
use crate::fs::{to_pretty_json, write_file_atomic};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const CARD_JSON_FILE: &str = "assurance_card.json";
pub const CARD_MARKDOWN_FILE: &str = "ASSURANCE_CARD.md";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskMetrics {
    pub task: String,
    pub precision: f64,
    pub recall: f64,
    pub sample_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskScore {
    pub task: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub sample_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssuranceCard {
    pub run_at: String,
    pub library_version: String,
    pub tasks: Vec<TaskScore>,
}

/// Paths written by [`write_assurance_card`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssuranceArtifacts {
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

/// Harmonic mean of precision and recall; 0 when both are 0.
pub fn f1_score(precision: f64, recall: f64) -> f64 {
    let sum = precision + recall;
    if sum == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / sum
    }
}

impl AssuranceCard {
    pub fn build(
        metrics: Vec<TaskMetrics>,
        library_version: impl Into<String>,
        clock: &dyn Clock,
    ) -> Result<Self> {
        let mut tasks = Vec::with_capacity(metrics.len());
        for m in metrics {
            if m.task.trim().is_empty() {
                return Err(ProvenanceError::AssuranceInput {
                    message: "task name must not be empty".into(),
                });
            }
            for (name, value) in [("precision", m.precision), ("recall", m.recall)] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ProvenanceError::AssuranceInput {
                        message: format!(
                            "{} for task '{}' must be within [0, 1], got {}",
                            name, m.task, value
                        ),
                    });
                }
            }
            tasks.push(TaskScore {
                f1: f1_score(m.precision, m.recall),
                task: m.task,
                precision: m.precision,
                recall: m.recall,
                sample_size: m.sample_size,
            });
        }
        Ok(Self {
            run_at: format_timestamp(clock.now()),
            library_version: library_version.into(),
            tasks,
        })
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "# Assurance Card\n\n- Version: {}\n- Run at: {}\n\n",
            self.library_version, self.run_at
        );
        out.push_str("| Task | Precision | Recall | F1 | N |\n|---|---:|---:|---:|---:|\n");
        for t in &self.tasks {
            let _ = writeln!(
                out,
                "| {} | {:.2} | {:.2} | {:.2} | {} |",
                t.task, t.precision, t.recall, t.f1, t.sample_size
            );
        }
        out
    }
}

pub fn read_task_metrics(path: &Path) -> Result<Vec<TaskMetrics>> {
    let bytes = std::fs::read(path).map_err(|e| ProvenanceError::read(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| ProvenanceError::AssuranceInput {
        message: format!("{}: {}", path.display(), e),
    })
}

/// Write both card artifacts into `dir`, creating it if needed.
pub fn write_assurance_card(dir: &Path, card: &AssuranceCard) -> Result<AssuranceArtifacts> {
    let json_path = dir.join(CARD_JSON_FILE);
    let markdown_path = dir.join(CARD_MARKDOWN_FILE);

    let json = to_pretty_json(card, "assurance card")?;
    let markdown = card.to_markdown();

    write_file_atomic(&json_path, &json)?;
    write_file_atomic(&markdown_path, markdown.as_bytes())?;
    tracing::info!(dir = %dir.display(), tasks = card.tasks.len(), "assurance card written");

    Ok(AssuranceArtifacts {
        json_path,
        markdown_path,
    })
}

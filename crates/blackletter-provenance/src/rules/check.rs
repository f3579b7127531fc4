//! Pre-flight validation of a rules directory.
//!
//! The loader is tolerant; this check is strict. It reports everything the
//! loader would silently skip or resolve, so rule authors can fix it before
//! a stamping run.

use super::discover::{discover_rule_files, relative_key};
use super::document::parse_rule_document;
use crate::error::{ProvenanceError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Error,
    Warning,
}

impl std::fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueLevel::Error => write!(f, "error"),
            IssueLevel::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleIssue {
    pub level: IssueLevel,
    /// Path relative to the rules directory.
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleCheckReport {
    pub files: usize,
    pub rules: usize,
    pub errors: Vec<RuleIssue>,
    pub warnings: Vec<RuleIssue>,
}

impl RuleCheckReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, level: IssueLevel, file: &str, rule_id: Option<&str>, message: String) {
        let issue = RuleIssue {
            level,
            file: file.to_string(),
            rule_id: rule_id.map(str::to_string),
            message,
        };
        match level {
            IssueLevel::Error => self.errors.push(issue),
            IssueLevel::Warning => self.warnings.push(issue),
        }
    }
}

/// Validate every rule file under `root`.
///
/// Errors: malformed YAML, missing id, duplicate id, `patterns` that is not a
/// list of valid regexes.
/// Warnings: missing title, missing or unquoted numeric version label.
pub fn check_rules_dir(root: &Path) -> Result<RuleCheckReport> {
    let files = discover_rule_files(root)?;
    let mut report = RuleCheckReport {
        files: files.len(),
        ..Default::default()
    };
    let mut seen: BTreeMap<String, String> = BTreeMap::new();

    for path in &files {
        let rel = relative_key(root, path);
        let bytes = std::fs::read(path).map_err(|e| ProvenanceError::read(path, e))?;
        let content = match String::from_utf8(bytes) {
            Ok(c) => c,
            Err(e) => {
                report.push(IssueLevel::Error, &rel, None, format!("not valid UTF-8: {e}"));
                continue;
            }
        };

        let doc = match parse_rule_document(&content) {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                report.push(
                    IssueLevel::Error,
                    &rel,
                    None,
                    "document is not a mapping".into(),
                );
                continue;
            }
            Err(reason) => {
                report.push(IssueLevel::Error, &rel, None, format!("invalid YAML: {reason}"));
                continue;
            }
        };

        let Some(id) = doc.id() else {
            report.push(IssueLevel::Error, &rel, None, "missing rule id".into());
            continue;
        };

        if let Some(first) = seen.get(&id) {
            report.push(
                IssueLevel::Error,
                &rel,
                Some(&id),
                format!("duplicate rule id (also defined in {first}); this file wins"),
            );
        } else {
            seen.insert(id.clone(), rel.clone());
        }

        match doc.patterns() {
            Ok(patterns) => {
                for pattern in &patterns {
                    if let Err(e) = regex::Regex::new(pattern) {
                        report.push(
                            IssueLevel::Error,
                            &rel,
                            Some(&id),
                            format!("invalid regex '{pattern}': {e}"),
                        );
                    }
                }
            }
            Err(reason) => report.push(IssueLevel::Error, &rel, Some(&id), reason),
        }

        if doc.title().is_none() {
            report.push(
                IssueLevel::Warning,
                &rel,
                Some(&id),
                "missing title; findings will carry empty rule_text".into(),
            );
        }
        if doc.version_label().is_none() {
            report.push(
                IssueLevel::Warning,
                &rel,
                Some(&id),
                "missing version label; findings will carry version \"unknown\"".into(),
            );
        } else if doc.version_is_numeric() {
            report.push(
                IssueLevel::Warning,
                &rel,
                Some(&id),
                format!(
                    "version label is an unquoted number and is recorded as \"{}\"; quote it to keep it verbatim",
                    doc.version_label().unwrap_or_default()
                ),
            );
        }
    }

    report.rules = seen.len();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_clean_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("r.yaml"),
            "id: r1\ntitle: Rule one\nversion: '1.0.0'\npatterns: ['(?i)processor']\n",
        )
        .unwrap();

        let report = check_rules_dir(dir.path()).unwrap();
        assert!(report.is_clean());
        assert!(report.warnings.is_empty());
        assert_eq!(report.files, 1);
        assert_eq!(report.rules, 1);
    }

    #[test]
    fn test_reports_every_problem_kind() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("a.yaml"), "id: dup\ntitle: A\nversion: '1'\n").unwrap();
        fs::write(root.join("b.yaml"), "id: dup\ntitle: B\nversion: '1'\n").unwrap();
        fs::write(root.join("c.yaml"), "title: no id\n").unwrap();
        fs::write(root.join("d.yaml"), "id: [broken\n").unwrap();
        fs::write(root.join("e.yaml"), "id: e\npatterns: ['(unclosed']\n").unwrap();

        let report = check_rules_dir(root).unwrap();
        assert!(!report.is_clean());

        let messages: Vec<(&str, &str)> = report
            .errors
            .iter()
            .map(|i| (i.file.as_str(), i.message.as_str()))
            .collect();
        assert!(messages
            .iter()
            .any(|(f, m)| *f == "b.yaml" && m.contains("duplicate rule id (also defined in a.yaml)")));
        assert!(messages
            .iter()
            .any(|(f, m)| *f == "c.yaml" && m.contains("missing rule id")));
        assert!(messages
            .iter()
            .any(|(f, m)| *f == "d.yaml" && m.starts_with("invalid YAML")));
        assert!(messages
            .iter()
            .any(|(f, m)| *f == "e.yaml" && m.starts_with("invalid regex")));

        // e.yaml lacks title and version
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.rules, 2);
    }

    #[test]
    fn test_pattern_shape_and_numeric_version() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("r.yaml"),
            "id: r1\ntitle: Rule one\nversion: 1.10\npatterns:\n  - regex: processor\n",
        )
        .unwrap();

        let report = check_rules_dir(dir.path()).unwrap();
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].message.starts_with("patterns must be a list of strings"));
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].message.contains("recorded as \"1.1\""));
        assert_eq!(report.rules, 1);
    }
}

//! Rule definition file parsing.
//!
//! Rule files are authored by hand, so the parser is lenient: unknown fields
//! are ignored and scalar ids/versions may be written unquoted.

use serde::Deserialize;

/// A YAML scalar rendered as text (`version: 1.0` and `version: "1.0"` both work).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    pub(crate) fn into_text(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Fields of a rule file the provenance tooling cares about.
///
/// Only `id`, `title` and the version fields must be scalars. `source` and
/// `patterns` are kept as raw YAML so an unexpected shape there never costs
/// the rule its metadata.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RuleDocument {
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub title: Option<Scalar>,
    #[serde(default)]
    pub version: Option<Scalar>,
    #[serde(default)]
    pub source: Option<serde_yaml::Value>,
    #[serde(default)]
    pub patterns: Option<serde_yaml::Value>,
}

impl RuleDocument {
    /// Non-empty rule id, if any.
    pub(crate) fn id(&self) -> Option<String> {
        non_empty(self.id.clone())
    }

    /// `source.version_label`, falling back to a top-level `version`.
    pub(crate) fn version_label(&self) -> Option<String> {
        non_empty(self.source_version_label()).or_else(|| non_empty(self.version.clone()))
    }

    /// True when the effective version label was written as an unquoted
    /// number, which YAML reads as int or float (`1.10` becomes `1.1`).
    pub(crate) fn version_is_numeric(&self) -> bool {
        let effective = match self.source_version_label() {
            Some(label) if !label.clone().into_text().is_empty() => Some(label),
            _ => self.version.clone(),
        };
        matches!(effective, Some(Scalar::Int(_) | Scalar::Float(_)))
    }

    pub(crate) fn title(&self) -> Option<String> {
        non_empty(self.title.clone())
    }

    /// `patterns` as a list of regex strings.
    pub(crate) fn patterns(&self) -> Result<Vec<String>, String> {
        match &self.patterns {
            None => Ok(Vec::new()),
            Some(value) => serde_yaml::from_value(value.clone())
                .map_err(|e| format!("patterns must be a list of strings: {e}")),
        }
    }

    fn source_version_label(&self) -> Option<Scalar> {
        let label = self.source.as_ref()?.get("version_label")?;
        serde_yaml::from_value(label.clone()).ok()
    }
}

fn non_empty(v: Option<Scalar>) -> Option<String> {
    v.map(Scalar::into_text).filter(|s| !s.is_empty())
}

/// Parse one rule file.
///
/// `Ok(None)` means the document is valid YAML but not a mapping (empty file,
/// list, bare scalar) and so cannot carry a rule. `Err` carries a message
/// suitable for a warning.
pub(crate) fn parse_rule_document(content: &str) -> Result<Option<RuleDocument>, String> {
    if is_blank_document(content) {
        return Ok(None);
    }
    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    match value {
        serde_yaml::Value::Mapping(_) => serde_yaml::from_value(value)
            .map(Some)
            .map_err(|e| e.to_string()),
        _ => Ok(None),
    }
}

fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let t = line.trim();
        t.is_empty() || t.starts_with('#') || t == "---"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_rule() {
        let doc = parse_rule_document(
            r#"
id: gdpr-dpa-1
title: DPA clause present
severity: high
source:
  version_label: "2025-08-01"
  url: https://eur-lex.europa.eu
patterns:
  - "data processing agreement"
"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(doc.id().as_deref(), Some("gdpr-dpa-1"));
        assert_eq!(doc.title().as_deref(), Some("DPA clause present"));
        assert_eq!(doc.version_label().as_deref(), Some("2025-08-01"));
        assert_eq!(doc.patterns().unwrap(), vec!["data processing agreement"]);
    }

    #[test]
    fn test_source_version_label_wins_over_top_level() {
        let doc = parse_rule_document("id: r\nversion: '1.0.0'\nsource:\n  version_label: v2\n")
            .unwrap()
            .unwrap();
        assert_eq!(doc.version_label().as_deref(), Some("v2"));
    }

    #[test]
    fn test_unquoted_scalars_render_as_text() {
        let doc = parse_rule_document("id: 42\nversion: 2\n").unwrap().unwrap();
        assert_eq!(doc.id().as_deref(), Some("42"));
        assert_eq!(doc.version_label().as_deref(), Some("2"));
    }

    #[test]
    fn test_unexpected_source_and_patterns_shapes_keep_metadata() {
        let doc = parse_rule_document(
            "id: r\ntitle: T\nversion: '1.0.0'\nsource: EUR-Lex\npatterns:\n  - regex: processor\n",
        )
        .unwrap()
        .unwrap();
        assert_eq!(doc.id().as_deref(), Some("r"));
        assert_eq!(doc.title().as_deref(), Some("T"));
        assert_eq!(doc.version_label().as_deref(), Some("1.0.0"));
        assert!(doc.patterns().is_err());
    }

    #[test]
    fn test_numeric_version_detection() {
        let doc = |s: &str| parse_rule_document(s).unwrap().unwrap();
        assert!(doc("id: r\nversion: 1.10\n").version_is_numeric());
        assert_eq!(doc("id: r\nversion: 1.10\n").version_label().as_deref(), Some("1.1"));
        assert!(doc("id: r\nsource:\n  version_label: 2025\n").version_is_numeric());
        assert!(!doc("id: r\nversion: '1.10'\n").version_is_numeric());
        assert!(!doc("id: r\nversion: 3\nsource:\n  version_label: v3\n").version_is_numeric());
        assert!(!doc("id: r\n").version_is_numeric());
    }

    #[test]
    fn test_empty_values_are_absent() {
        let doc = parse_rule_document("id: ''\ntitle: ''\nsource: {}\n")
            .unwrap()
            .unwrap();
        assert_eq!(doc.id(), None);
        assert_eq!(doc.title(), None);
        assert_eq!(doc.version_label(), None);
    }

    #[test]
    fn test_non_mapping_documents() {
        assert!(parse_rule_document("").unwrap().is_none());
        assert!(parse_rule_document("# comment only\n---\n").unwrap().is_none());
        assert!(parse_rule_document("- a\n- b\n").unwrap().is_none());
        assert!(parse_rule_document("just text").unwrap().is_none());
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        assert!(parse_rule_document("id: [unclosed").is_err());
        assert!(parse_rule_document("id: {a: 1}\n").is_err());
    }
}

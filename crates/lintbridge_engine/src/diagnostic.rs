//! Canonical problem types shared by every engine.

use serde::{Deserialize, Serialize};

/// Severity level for problems.
///
/// Every engine's native severity is mapped onto these three levels at the
/// adapter boundary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message.
    Info,
    /// Should be reviewed.
    Warn,
    /// Must be fixed.
    #[default]
    Error,
}

/// One normalized lint finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    /// Human-readable message.
    pub message: String,

    /// Normalized severity.
    pub severity: Severity,

    /// 1-based line number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,

    /// 0-based character offset within the line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_offset: Option<u32>,

    /// Raw snippet of the offending line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_content: Option<String>,

    /// Path of the file the problem belongs to.
    pub source: String,
}

impl Problem {
    /// Creates a new problem with error severity and no position.
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
            line_number: None,
            character_offset: None,
            line_content: None,
            source: source.into(),
        }
    }

    /// Sets the severity level.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the line number and character offset.
    pub fn with_position(mut self, line: Option<u32>, offset: Option<u32>) -> Self {
        self.line_number = line;
        self.character_offset = offset;
        self
    }

    /// Sets the line content snippet.
    pub fn with_line_content(mut self, content: Option<String>) -> Self {
        self.line_content = content;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_new_defaults_to_error() {
        let problem = Problem::new("a.js", "unexpected token");

        assert_eq!(problem.severity, Severity::Error);
        assert_eq!(problem.source, "a.js");
        assert!(problem.line_number.is_none());
    }

    #[test]
    fn test_problem_serialization_uses_camel_case() {
        let problem = Problem::new("a.js", "unexpected token")
            .with_position(Some(3), Some(5))
            .with_line_content(Some("var = ;".to_string()));
        let json = serde_json::to_value(&problem).unwrap();

        assert_eq!(json["lineNumber"], 3);
        assert_eq!(json["characterOffset"], 5);
        assert_eq!(json["lineContent"], "var = ;");
        assert_eq!(json["severity"], "error");
    }

    #[test]
    fn test_problem_serialization_omits_absent_fields() {
        let problem = Problem::new("a.js", "msg").with_severity(Severity::Warn);
        let json = serde_json::to_string(&problem).unwrap();

        assert!(!json.contains("lineNumber"));
        assert!(!json.contains("characterOffset"));
        assert!(!json.contains("lineContent"));
        assert!(json.contains(r#""severity":"warn""#));
    }

    #[test]
    fn test_severity_wire_names() {
        let names = serde_json::to_value([Severity::Info, Severity::Warn, Severity::Error]).unwrap();
        assert_eq!(names, serde_json::json!(["info", "warn", "error"]));
    }
}

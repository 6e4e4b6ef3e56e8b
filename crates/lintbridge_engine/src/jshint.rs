//! JSHint adapter.
//!
//! JSHint reports a flat array of errors. Each carries an `id` such as
//! `"(error)"` whose bracket contents name the severity, and a 1-based
//! `character` column.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::adapter::source_name;
use crate::{
    EngineAdapter, EngineBackend, EngineError, EngineKind, EngineOutput, EngineRequest, Problem,
    Severity,
};

/// Maps a bracketed JSHint identifier such as `(warning)` to the canonical
/// level.
///
/// Identifiers outside the known set are treated as errors.
pub fn severity(id: &str) -> Severity {
    let code = id
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(id);

    match code {
        "error" => Severity::Error,
        "warning" | "warn" => Severity::Warn,
        "info" => Severity::Info,
        other => {
            debug!("Unknown JSHint identifier '{}', treating as error", other);
            Severity::Error
        }
    }
}

#[derive(Debug, Deserialize)]
struct JshintError {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    reason: String,
    line: Option<u32>,
    character: Option<u32>,
    evidence: Option<String>,
}

/// Parses a flat list of engine errors, skipping the `null` placeholders
/// JSHint and JSLint leave behind when they stop early.
pub(crate) fn non_null_entries(
    engine: &'static str,
    report: Value,
) -> Result<Vec<Value>, EngineError> {
    let entries: Vec<Value> =
        serde_json::from_value(report).map_err(|e| EngineError::malformed(engine, e))?;
    Ok(entries.into_iter().filter(|entry| !entry.is_null()).collect())
}

/// Adapter for JSHint.
pub struct JshintAdapter {
    backend: Arc<dyn EngineBackend>,
}

impl JshintAdapter {
    const ENGINE: &'static str = "JSHint";

    pub fn new(backend: Arc<dyn EngineBackend>) -> Self {
        Self { backend }
    }
}

impl EngineAdapter for JshintAdapter {
    fn kind(&self) -> EngineKind {
        EngineKind::Jshint
    }

    fn lint(
        &self,
        path: &Path,
        source: Option<&str>,
        options: &Value,
    ) -> Result<EngineOutput, EngineError> {
        let paths = [path.to_path_buf()];
        let request = EngineRequest::new(self.kind(), &paths, options).with_source(source);
        let diagnostics = non_null_entries(Self::ENGINE, self.backend.invoke(&request)?)?;

        let source = source_name(path);
        let problems = diagnostics
            .iter()
            .map(|raw| {
                let error: JshintError = serde_json::from_value(raw.clone())
                    .map_err(|e| EngineError::malformed(Self::ENGINE, e))?;
                let severity = error.id.as_deref().map_or(Severity::Error, severity);
                Ok(Problem::new(&source, error.reason)
                    .with_severity(severity)
                    .with_position(error.line, error.character.map(|c| c.saturating_sub(1)))
                    .with_line_content(error.evidence))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let clean = diagnostics.is_empty();
        Ok(EngineOutput::new(path, diagnostics, problems, clean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn adapter_with(report: Value) -> JshintAdapter {
        JshintAdapter::new(Arc::new(
            move |_: &EngineRequest<'_>| -> Result<Value, EngineError> { Ok(report.clone()) },
        ))
    }

    #[rstest]
    #[case("(error)", Severity::Error)]
    #[case("(warning)", Severity::Warn)]
    #[case("(info)", Severity::Info)]
    #[case("(something)", Severity::Error)]
    #[case("warning", Severity::Warn)]
    fn test_severity(#[case] id: &str, #[case] expected: Severity) {
        assert_eq!(severity(id), expected);
    }

    #[test]
    fn test_lint_converts_columns_to_offsets() {
        let adapter = adapter_with(json!([{
            "id": "(error)",
            "code": "E030",
            "reason": "Expected an identifier and instead saw '='.",
            "line": 1,
            "character": 5,
            "evidence": "var = 1;"
        }]));

        let output = adapter.lint(Path::new("a.js"), Some("var = 1;"), &json!({})).unwrap();

        assert!(!output.clean);
        assert_eq!(
            output.problems,
            vec![
                Problem::new("a.js", "Expected an identifier and instead saw '='.")
                    .with_position(Some(1), Some(4))
                    .with_line_content(Some("var = 1;".to_string()))
            ]
        );
        assert_eq!(output.diagnostics[0]["code"], "E030");
    }

    #[test]
    fn test_warning_makes_file_unclean() {
        let adapter = adapter_with(json!([
            { "id": "(warning)", "reason": "Missing semicolon.", "line": 2, "character": 10 }
        ]));

        let output = adapter.lint(Path::new("a.js"), Some(""), &json!({})).unwrap();

        assert!(!output.clean);
        assert_eq!(output.problems[0].severity, Severity::Warn);
        assert_eq!(output.problems[0].character_offset, Some(9));
    }

    #[test]
    fn test_null_entries_are_skipped() {
        let adapter = adapter_with(json!([
            { "id": "(error)", "reason": "Too many errors.", "line": 9, "character": 1 },
            null
        ]));

        let output = adapter.lint(Path::new("a.js"), Some(""), &json!({})).unwrap();

        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.problems.len(), 1);
        assert_eq!(output.problems[0].character_offset, Some(0));
    }

    #[test]
    fn test_empty_report_is_clean() {
        let adapter = adapter_with(json!([]));

        let output = adapter.lint(Path::new("b.js"), Some(""), &json!({})).unwrap();

        assert!(output.clean);
        assert!(output.rewritten.is_none());
    }

    #[test]
    fn test_malformed_report() {
        let adapter = adapter_with(json!({ "errors": 3 }));

        let err = adapter.lint(Path::new("a.js"), Some(""), &json!({})).unwrap_err();
        assert!(matches!(err, EngineError::Malformed { engine: "JSHint", .. }));
    }
}

//! JSLint adapter.
//!
//! JSLint reports a flat list of warnings with no severity. Every entry is an
//! error, and positions pass through unchanged.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::adapter::source_name;
use crate::jshint::non_null_entries;
use crate::{
    EngineAdapter, EngineBackend, EngineError, EngineKind, EngineOutput, EngineRequest, Problem,
    Severity,
};

#[derive(Debug, Deserialize)]
struct JslintWarning {
    #[serde(default, alias = "message")]
    reason: String,
    line: Option<u32>,
    #[serde(alias = "column")]
    character: Option<u32>,
    evidence: Option<String>,
}

/// Adapter for JSLint.
pub struct JslintAdapter {
    backend: Arc<dyn EngineBackend>,
}

impl JslintAdapter {
    const ENGINE: &'static str = "JSLint";

    pub fn new(backend: Arc<dyn EngineBackend>) -> Self {
        Self { backend }
    }
}

impl EngineAdapter for JslintAdapter {
    fn kind(&self) -> EngineKind {
        EngineKind::Jslint
    }

    fn lint(
        &self,
        path: &Path,
        source: Option<&str>,
        options: &Value,
    ) -> Result<EngineOutput, EngineError> {
        let paths = [path.to_path_buf()];
        let request = EngineRequest::new(self.kind(), &paths, options).with_source(source);
        // Either the bare list or an object wrapping it.
        let list = match self.backend.invoke(&request)? {
            Value::Object(mut report) => report
                .remove("warnings")
                .or_else(|| report.remove("errors"))
                .unwrap_or(Value::Null),
            other => other,
        };
        let diagnostics = non_null_entries(Self::ENGINE, list)?;

        let source = source_name(path);
        let problems = diagnostics
            .iter()
            .map(|raw| {
                let warning: JslintWarning = serde_json::from_value(raw.clone())
                    .map_err(|e| EngineError::malformed(Self::ENGINE, e))?;
                Ok(Problem::new(&source, warning.reason)
                    .with_severity(Severity::Error)
                    .with_position(warning.line, warning.character)
                    .with_line_content(warning.evidence))
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        let clean = diagnostics.is_empty();
        Ok(EngineOutput::new(path, diagnostics, problems, clean))
    }
}

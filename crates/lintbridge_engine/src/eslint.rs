//! ESLint adapter, second generation.
//!
//! Lints one file per invocation with source on stdin. The engine's `output`
//! field carries autofixed source when a fix was applied.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::adapter::source_name;
use crate::{
    EngineAdapter, EngineBackend, EngineError, EngineKind, EngineOutput, EngineRequest, Problem,
    Severity,
};

/// Maps an ESLint severity to the canonical level.
///
/// `0` is informational, `1` a warning, anything else an error.
pub fn severity(value: u64) -> Severity {
    match value {
        0 => Severity::Info,
        1 => Severity::Warn,
        _ => Severity::Error,
    }
}

/// One file entry of an ESLint report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EslintFileReport {
    pub file_path: String,
    #[serde(default)]
    pub messages: Vec<Value>,
    pub error_count: Option<u64>,
    pub warning_count: Option<u64>,
    pub output: Option<String>,
}

/// One message of an ESLint file entry.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EslintMessage {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub severity: u64,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub source: Option<String>,
}

/// A report holding one or more file entries, bare or wrapped in `results`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum EslintReport {
    Wrapped { results: Vec<EslintFileReport> },
    Many(Vec<EslintFileReport>),
    Single(EslintFileReport),
}

impl EslintReport {
    pub(crate) fn parse(engine: &'static str, value: Value) -> Result<Self, EngineError> {
        serde_json::from_value(value).map_err(|e| EngineError::malformed(engine, e))
    }

    pub(crate) fn into_files(self) -> Vec<EslintFileReport> {
        match self {
            EslintReport::Wrapped { results } | EslintReport::Many(results) => results,
            EslintReport::Single(file) => vec![file],
        }
    }
}

/// Normalizes the messages of one file entry.
///
/// Returns the native messages, the problems, and the `(errors, warnings)`
/// counts derived from the normalized severities.
pub(crate) fn normalize_messages(
    engine: &'static str,
    source: &str,
    messages: Vec<Value>,
    to_severity: fn(u64) -> Severity,
) -> Result<(Vec<Value>, Vec<Problem>, u64, u64), EngineError> {
    let mut problems = Vec::with_capacity(messages.len());
    let mut errors = 0;
    let mut warnings = 0;

    for raw in &messages {
        let message: EslintMessage = serde_json::from_value(raw.clone())
            .map_err(|e| EngineError::malformed(engine, e))?;
        let severity = to_severity(message.severity);
        match severity {
            Severity::Error => errors += 1,
            Severity::Warn => warnings += 1,
            Severity::Info => {}
        }
        problems.push(
            Problem::new(source, message.message)
                .with_severity(severity)
                .with_position(message.line, message.column)
                .with_line_content(message.source),
        );
    }

    Ok((messages, problems, errors, warnings))
}

/// Whether a reported file path names the requested path.
///
/// Engines often report absolute paths for relative inputs, so a
/// component-wise suffix match is accepted.
pub(crate) fn reports_path(reported: &str, path: &Path) -> bool {
    let reported = Path::new(reported);
    reported == path || reported.ends_with(path)
}

/// Picks the entry for `path`, falling back to the only entry present.
pub(crate) fn entry_for(files: Vec<EslintFileReport>, path: &Path) -> Option<EslintFileReport> {
    let count = files.len();
    let mut fallback = None;
    for file in files {
        if reports_path(&file.file_path, path) {
            return Some(file);
        }
        if count == 1 {
            fallback = Some(file);
        }
    }
    fallback
}

/// Adapter for the second ESLint generation.
pub struct EslintAdapter {
    backend: Arc<dyn EngineBackend>,
}

impl EslintAdapter {
    const ENGINE: &'static str = "ESLint";

    pub fn new(backend: Arc<dyn EngineBackend>) -> Self {
        Self { backend }
    }
}

impl EngineAdapter for EslintAdapter {
    fn kind(&self) -> EngineKind {
        EngineKind::Eslint
    }

    fn supports_autofix(&self) -> bool {
        true
    }

    fn lint(
        &self,
        path: &Path,
        source: Option<&str>,
        options: &Value,
    ) -> Result<EngineOutput, EngineError> {
        let paths = [path.to_path_buf()];
        let request = EngineRequest::new(self.kind(), &paths, options).with_source(source);
        let report = EslintReport::parse(Self::ENGINE, self.backend.invoke(&request)?)?;

        let Some(entry) = entry_for(report.into_files(), path) else {
            // ESLint emits no entry for files it was told to ignore.
            return Ok(EngineOutput::new(path, Vec::new(), Vec::new(), true));
        };

        let source = source_name(path);
        let (diagnostics, problems, errors, warnings) =
            normalize_messages(Self::ENGINE, &source, entry.messages, severity)?;

        let error_count = entry.error_count.unwrap_or(errors);
        let warning_count = entry.warning_count.unwrap_or(warnings);
        let clean = error_count == 0 && warning_count == 0;

        Ok(
            EngineOutput::new(PathBuf::from(path), diagnostics, problems, clean)
                .with_rewritten(entry.output),
        )
    }
}

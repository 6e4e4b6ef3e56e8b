//! Engine adapter abstraction.
//!
//! This module provides the `EngineAdapter` trait which abstracts over the
//! supported lint engines, so the orchestration logic is written once and
//! the engine is picked by configuration.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::eslint::EslintAdapter;
use crate::eslint_legacy::EslintLegacyAdapter;
use crate::jshint::JshintAdapter;
use crate::jslint::JslintAdapter;
use crate::{EngineBackend, EngineError, Problem};

/// Supported lint engines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// ESLint through the batch `CLIEngine` report (first generation).
    EslintLegacy,
    /// ESLint one file at a time, with autofix output (second generation).
    Eslint,
    /// JSHint.
    #[default]
    Jshint,
    /// JSLint.
    Jslint,
}

impl EngineKind {
    /// All engines, in selector order.
    pub const ALL: [EngineKind; 4] = [
        EngineKind::EslintLegacy,
        EngineKind::Eslint,
        EngineKind::Jshint,
        EngineKind::Jslint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::EslintLegacy => "eslint-legacy",
            EngineKind::Eslint => "eslint",
            EngineKind::Jshint => "jshint",
            EngineKind::Jslint => "jslint",
        }
    }

    /// Get the human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            EngineKind::EslintLegacy => "ESLint (legacy)",
            EngineKind::Eslint => "ESLint",
            EngineKind::Jshint => "JSHint",
            EngineKind::Jslint => "JSLint",
        }
    }

    /// Builds the adapter for this engine on top of the given backend.
    pub fn adapter(self, backend: Arc<dyn EngineBackend>) -> Arc<dyn EngineAdapter> {
        match self {
            EngineKind::EslintLegacy => Arc::new(EslintLegacyAdapter::new(backend)),
            EngineKind::Eslint => Arc::new(EslintAdapter::new(backend)),
            EngineKind::Jshint => Arc::new(JshintAdapter::new(backend)),
            EngineKind::Jslint => Arc::new(JslintAdapter::new(backend)),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eslint-legacy" | "eslint-v1" | "eslint1" => Ok(EngineKind::EslintLegacy),
            "eslint" | "eslint-v2" | "eslint2" => Ok(EngineKind::Eslint),
            "jshint" => Ok(EngineKind::Jshint),
            "jslint" => Ok(EngineKind::Jslint),
            _ => Err(EngineError::UnknownEngine(s.to_string())),
        }
    }
}

/// How an engine consumes its input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionShape {
    /// The engine is invoked once over the whole ordered path list and reads
    /// the files itself.
    Batch,
    /// Each file is read by the host and handed to the engine on its own.
    PerFile,
}

/// Normalized outcome of linting one file.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    /// The file the report belongs to, as reported by the engine.
    pub path: PathBuf,
    /// Engine-native diagnostics, verbatim and in engine order.
    pub diagnostics: Vec<serde_json::Value>,
    /// Diagnostics normalized to the canonical shape.
    pub problems: Vec<Problem>,
    /// Whether the file passes this engine's clean predicate.
    pub clean: bool,
    /// Rewritten source produced by autofix, if any.
    pub rewritten: Option<String>,
}

impl EngineOutput {
    /// Creates an output with no rewritten text.
    pub fn new(
        path: impl Into<PathBuf>,
        diagnostics: Vec<serde_json::Value>,
        problems: Vec<Problem>,
        clean: bool,
    ) -> Self {
        Self {
            path: path.into(),
            diagnostics,
            problems,
            clean,
            rewritten: None,
        }
    }

    /// Sets the rewritten source.
    pub fn with_rewritten(mut self, rewritten: Option<String>) -> Self {
        self.rewritten = rewritten;
        self
    }
}

/// One input's share of a batch invocation.
#[derive(Debug)]
pub struct BatchEntry {
    /// The input path the entry is attributed to.
    pub path: PathBuf,
    pub output: Result<EngineOutput, EngineError>,
}

/// Capability shared by every engine adapter.
///
/// Implementations:
///
/// - `EslintLegacyAdapter`: batch report, numeric 1/2 severities
/// - `EslintAdapter`: per-file report, numeric 0/1/2 severities, autofix
/// - `JshintAdapter`: bracketed `(code)` severities, 1-based columns
/// - `JslintAdapter`: flat error list, everything is an error
pub trait EngineAdapter: Send + Sync {
    /// The engine this adapter speaks for.
    fn kind(&self) -> EngineKind;

    /// How the engine consumes input files.
    fn shape(&self) -> ExecutionShape {
        ExecutionShape::PerFile
    }

    /// Whether the engine may return rewritten source.
    fn supports_autofix(&self) -> bool {
        false
    }

    /// Lints one file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the file, forwarded to the engine and used as the
    ///   problem source
    /// * `source` - Already-read source text, or `None` when the engine reads
    ///   the file itself
    /// * `options` - Engine options, forwarded verbatim
    fn lint(
        &self,
        path: &Path,
        source: Option<&str>,
        options: &serde_json::Value,
    ) -> Result<EngineOutput, EngineError>;

    /// Lints a whole ordered batch with the engine reading its own inputs.
    ///
    /// Returns one entry per input path. Reported files come first, in
    /// engine-report order; inputs the report says nothing about follow with
    /// an error. The outer error means the invocation itself failed.
    fn lint_batch(
        &self,
        paths: &[PathBuf],
        options: &serde_json::Value,
    ) -> Result<Vec<BatchEntry>, EngineError> {
        Ok(paths
            .iter()
            .map(|path| BatchEntry {
                path: path.clone(),
                output: self.lint(path, None, options),
            })
            .collect())
    }
}

/// Display form of a path used for problem sources.
pub(crate) fn source_name(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("eslint-legacy", EngineKind::EslintLegacy)]
    #[case("ESLint", EngineKind::Eslint)]
    #[case("eslint-v2", EngineKind::Eslint)]
    #[case("jshint", EngineKind::Jshint)]
    #[case("JSLint", EngineKind::Jslint)]
    fn test_engine_kind_from_str(#[case] input: &str, #[case] expected: EngineKind) {
        assert_eq!(input.parse::<EngineKind>().unwrap(), expected);
    }

    #[test]
    fn test_engine_kind_from_str_unknown() {
        let err = "tslint".parse::<EngineKind>().unwrap_err();
        assert!(matches!(err, EngineError::UnknownEngine(name) if name == "tslint"));
    }

    #[test]
    fn test_engine_kind_round_trips_through_as_str() {
        for kind in EngineKind::ALL {
            assert_eq!(kind.as_str().parse::<EngineKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_engine_kind_serde_names() {
        let json = serde_json::to_string(&EngineKind::EslintLegacy).unwrap();
        assert_eq!(json, r#""eslint-legacy""#);

        let kind: EngineKind = serde_json::from_str(r#""jslint""#).unwrap();
        assert_eq!(kind, EngineKind::Jslint);
    }

    #[test]
    fn test_adapter_capabilities() {
        let backend: Arc<dyn EngineBackend> = Arc::new(
            |_: &crate::EngineRequest<'_>| -> Result<serde_json::Value, EngineError> {
                Ok(serde_json::json!([]))
            },
        );

        let legacy = EngineKind::EslintLegacy.adapter(backend.clone());
        assert_eq!(legacy.shape(), ExecutionShape::Batch);
        assert!(!legacy.supports_autofix());

        let eslint = EngineKind::Eslint.adapter(backend.clone());
        assert_eq!(eslint.shape(), ExecutionShape::PerFile);
        assert!(eslint.supports_autofix());

        for kind in [EngineKind::Jshint, EngineKind::Jslint] {
            let adapter = kind.adapter(backend.clone());
            assert_eq!(adapter.kind(), kind);
            assert_eq!(adapter.shape(), ExecutionShape::PerFile);
            assert!(!adapter.supports_autofix());
        }
    }
}

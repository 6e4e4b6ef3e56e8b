//! Per-file results and the run envelope.

use std::fmt;
use std::path::PathBuf;

use lintbridge_engine::Problem;
use serde::{Deserialize, Serialize};

/// What a successfully linted file touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub files_read: Vec<String>,
    pub files_written: Vec<String>,
}

/// Result record for one linted file.
///
/// `result` is `null` on the wire when the file did not pass its engine's
/// clean predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    pub source: String,
    pub result: Option<FileStatus>,
}

impl FileResult {
    /// A clean file, optionally rewritten in place by autofix.
    pub fn clean(source: impl Into<String>, written: bool) -> Self {
        let source = source.into();
        let files_written = if written {
            vec![source.clone()]
        } else {
            Vec::new()
        };
        Self {
            result: Some(FileStatus {
                files_read: vec![source.clone()],
                files_written,
            }),
            source,
        }
    }

    /// A file that failed its clean predicate.
    pub fn unclean(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            result: None,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.result.is_some()
    }
}

/// Batch-protocol payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub results: Vec<FileResult>,
    pub problems: Vec<Problem>,
}

/// Why a file produced no result, or lost its autofix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The source could not be read.
    Read,
    /// The engine failed on the file.
    Engine,
    /// Autofixed source could not be written back.
    Write,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::Read => "read",
            FailureKind::Engine => "engine",
            FailureKind::Write => "write",
        })
    }
}

/// A per-file failure. Reported on the side channel, never in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

impl FileFailure {
    pub fn new(path: impl Into<PathBuf>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.kind {
            FailureKind::Read => "read",
            FailureKind::Engine => "lint",
            FailureKind::Write => "write autofix to",
        };
        write!(
            f,
            "Failed to {} {}: {}",
            action,
            self.path.display(),
            self.message
        )
    }
}

/// Counters for one run. Not part of the structured output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Result records produced.
    pub results: usize,
    /// Problem records produced.
    pub problems: usize,
    /// Results with a `null` status.
    pub unclean: usize,
    /// Per-file failures, in the order they were settled.
    pub failures: Vec<FileFailure>,
}

impl RunSummary {
    /// Every file produced a clean result and nothing failed.
    pub fn is_clean(&self) -> bool {
        self.unclean == 0 && self.failures.is_empty()
    }

    /// Number of failures of one kind.
    pub fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_file_result_wire_form() {
        let clean = serde_json::to_value(FileResult::clean("b.js", false)).unwrap();
        assert_eq!(
            clean,
            json!({ "source": "b.js", "result": { "filesRead": ["b.js"], "filesWritten": [] } })
        );

        let fixed = serde_json::to_value(FileResult::clean("c.js", true)).unwrap();
        assert_eq!(fixed["result"]["filesWritten"], json!(["c.js"]));

        let unclean = serde_json::to_value(FileResult::unclean("a.js")).unwrap();
        assert_eq!(unclean, json!({ "source": "a.js", "result": null }));
    }

    #[test]
    fn test_failure_display() {
        let failure = FileFailure::new("missing.js", FailureKind::Read, "No such file");
        assert_eq!(failure.to_string(), "Failed to read missing.js: No such file");

        let failure = FileFailure::new("c.js", FailureKind::Write, "denied");
        assert_eq!(failure.to_string(), "Failed to write autofix to c.js: denied");
    }

    #[test]
    fn test_summary_is_clean() {
        let mut summary = RunSummary {
            results: 2,
            ..Default::default()
        };
        assert!(summary.is_clean());

        summary
            .failures
            .push(FileFailure::new("a.js", FailureKind::Engine, "boom"));
        assert!(!summary.is_clean());
        assert_eq!(summary.failures_of(FailureKind::Engine), 1);
        assert_eq!(summary.failures_of(FailureKind::Read), 0);
    }
}

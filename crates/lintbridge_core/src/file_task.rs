//! File Task Runner.
//!
//! Turns one file (or, for batch engines, the whole path list) into per-file
//! outcomes: a result record, its problems and the engine-native diagnostics.

use std::io;
use std::path::{Path, PathBuf};

use lintbridge_engine::{BatchEntry, EngineAdapter, EngineOutput, Problem};
use serde_json::Value;
use tracing::{debug, info};

use crate::io::HostIo;
use crate::{FailureKind, FileFailure, FileResult};

/// A linted file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub result: FileResult,
    pub problems: Vec<Problem>,
    /// Engine-native diagnostics, used by the legacy framing.
    pub diagnostics: Vec<Value>,
    /// Set when autofixed source could not be written back.
    pub write_failure: Option<FileFailure>,
}

/// What a file task settles to.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Linted(FileOutcome),
    /// No result and no problems for this file.
    Failed(FileFailure),
}

/// Runs the engine for files and finalizes their outcomes.
pub struct FileTaskRunner<'a> {
    adapter: &'a dyn EngineAdapter,
    io: &'a dyn HostIo,
    options: &'a Value,
    fix: bool,
}

impl<'a> FileTaskRunner<'a> {
    pub fn new(
        adapter: &'a dyn EngineAdapter,
        io: &'a dyn HostIo,
        options: &'a Value,
        fix: bool,
    ) -> Self {
        Self {
            adapter,
            io,
            options,
            fix,
        }
    }

    /// Lints one file whose read has completed.
    pub fn run(&self, path: &Path, read: io::Result<String>) -> TaskOutcome {
        let source = match read {
            Ok(source) => source,
            Err(e) => return self.fail(path, FailureKind::Read, e.to_string()),
        };

        debug!("Linting {}", path.display());
        match self.adapter.lint(path, Some(&source), self.options) {
            Ok(output) => TaskOutcome::Linted(self.finalize(path, output)),
            Err(e) => self.fail(path, FailureKind::Engine, e.to_string()),
        }
    }

    /// Lints the whole ordered path list with one engine invocation.
    ///
    /// Yields exactly one outcome per input. Reported files follow the
    /// engine's report order; inputs the report leaves out settle as engine
    /// failures after them. When the engine itself fails, every input
    /// settles as an engine failure.
    pub fn run_batch(&self, paths: &[PathBuf]) -> Vec<TaskOutcome> {
        debug!(
            "Linting {} file(s) in one {} invocation",
            paths.len(),
            self.adapter.kind().display_name()
        );

        match self.adapter.lint_batch(paths, self.options) {
            Ok(entries) => entries
                .into_iter()
                .map(|BatchEntry { path, output }| match output {
                    Ok(output) => TaskOutcome::Linted(self.finalize(&path, output)),
                    Err(e) => self.fail(&path, FailureKind::Engine, e.to_string()),
                })
                .collect(),
            Err(e) => {
                self.io.report(&format!(
                    "{} failed: {}",
                    self.adapter.kind().display_name(),
                    e
                ));
                let message = e.to_string();
                paths
                    .iter()
                    .map(|path| {
                        TaskOutcome::Failed(FileFailure::new(
                            path,
                            FailureKind::Engine,
                            message.clone(),
                        ))
                    })
                    .collect()
            }
        }
    }

    /// Applies autofix and builds the result record.
    fn finalize(&self, path: &Path, output: EngineOutput) -> FileOutcome {
        let source = path.display().to_string();
        let mut written = false;
        let mut write_failure = None;

        if let Some(rewritten) = output.rewritten.as_deref()
            && self.adapter.supports_autofix()
        {
            if !self.fix {
                debug!("Discarding autofix for {} (fixes disabled)", source);
            } else {
                match self.io.write_file(path, rewritten) {
                    Ok(()) => {
                        info!("Fixed {}", source);
                        written = true;
                    }
                    Err(e) => {
                        let failure = FileFailure::new(path, FailureKind::Write, e.to_string());
                        self.io.report(&failure.to_string());
                        write_failure = Some(failure);
                    }
                }
            }
        }

        let result = if output.clean {
            FileResult::clean(&source, written)
        } else {
            FileResult::unclean(&source)
        };

        FileOutcome {
            result,
            problems: output.problems,
            diagnostics: output.diagnostics,
            write_failure,
        }
    }

    fn fail(&self, path: &Path, kind: FailureKind, message: String) -> TaskOutcome {
        let failure = FileFailure::new(path, kind, message);
        self.io.report(&failure.to_string());
        TaskOutcome::Failed(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryIo;
    use lintbridge_engine::{EngineBackend, EngineError, EngineKind, EngineRequest, Severity};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn backend(report: Value) -> Arc<dyn EngineBackend> {
        Arc::new(move |_: &EngineRequest<'_>| -> Result<Value, EngineError> { Ok(report.clone()) })
    }

    fn failing_backend() -> Arc<dyn EngineBackend> {
        Arc::new(|_: &EngineRequest<'_>| -> Result<Value, EngineError> {
            Err(EngineError::output("node", "no report on stdout", "boom"))
        })
    }

    #[test]
    fn test_clean_file() {
        let adapter = EngineKind::Jshint.adapter(backend(json!([])));
        let io = MemoryIo::new();
        let options = json!({});
        let runner = FileTaskRunner::new(adapter.as_ref(), &io, &options, true);

        let outcome = runner.run(Path::new("b.js"), Ok("var b;".to_string()));

        let TaskOutcome::Linted(outcome) = outcome else {
            panic!("Expected a linted outcome");
        };
        assert_eq!(outcome.result, FileResult::clean("b.js", false));
        assert!(outcome.problems.is_empty());
    }

    #[test]
    fn test_read_failure_is_reported() {
        let adapter = EngineKind::Jshint.adapter(backend(json!([])));
        let io = MemoryIo::new();
        let options = json!({});
        let runner = FileTaskRunner::new(adapter.as_ref(), &io, &options, true);

        let outcome = runner.run(
            Path::new("missing.js"),
            Err(io::Error::new(io::ErrorKind::NotFound, "not found")),
        );

        assert_eq!(
            outcome,
            TaskOutcome::Failed(FileFailure::new(
                "missing.js",
                FailureKind::Read,
                "not found"
            ))
        );
        assert_eq!(io.reports(), vec!["Failed to read missing.js: not found"]);
    }

    #[test]
    fn test_engine_failure_for_one_file() {
        let adapter = EngineKind::Jslint.adapter(failing_backend());
        let io = MemoryIo::new();
        let options = json!({});
        let runner = FileTaskRunner::new(adapter.as_ref(), &io, &options, true);

        let outcome = runner.run(Path::new("a.js"), Ok(String::new()));

        let TaskOutcome::Failed(failure) = outcome else {
            panic!("Expected a failed outcome");
        };
        assert_eq!(failure.kind, FailureKind::Engine);
        assert_eq!(io.reports().len(), 1);
    }

    #[test]
    fn test_autofix_is_written() {
        let adapter = EngineKind::Eslint.adapter(backend(json!([{
            "filePath": "c.js",
            "messages": [],
            "errorCount": 0,
            "warningCount": 0,
            "output": "var c = 1;\n"
        }])));
        let io = MemoryIo::new().with_file("c.js", "var c = 1\n");
        let options = json!({});
        let runner = FileTaskRunner::new(adapter.as_ref(), &io, &options, true);

        let TaskOutcome::Linted(outcome) = runner.run(Path::new("c.js"), Ok("var c = 1\n".into()))
        else {
            panic!("Expected a linted outcome");
        };

        assert_eq!(outcome.result, FileResult::clean("c.js", true));
        assert_eq!(io.file("c.js").as_deref(), Some("var c = 1;\n"));
    }

    #[test]
    fn test_autofix_discarded_when_disabled() {
        let adapter = EngineKind::Eslint.adapter(backend(json!({
            "filePath": "c.js",
            "messages": [],
            "output": "var c = 1;\n"
        })));
        let io = MemoryIo::new().with_file("c.js", "var c = 1\n");
        let options = json!({});
        let runner = FileTaskRunner::new(adapter.as_ref(), &io, &options, false);

        let TaskOutcome::Linted(outcome) = runner.run(Path::new("c.js"), Ok("var c = 1\n".into()))
        else {
            panic!("Expected a linted outcome");
        };

        assert_eq!(outcome.result, FileResult::clean("c.js", false));
        assert_eq!(io.file("c.js").as_deref(), Some("var c = 1\n"));
    }

    #[test]
    fn test_autofix_write_failure() {
        let adapter = EngineKind::Eslint.adapter(backend(json!({
            "filePath": "c.js",
            "messages": [],
            "output": "var c = 1;\n"
        })));
        let io = MemoryIo::new().read_only();
        let options = json!({});
        let runner = FileTaskRunner::new(adapter.as_ref(), &io, &options, true);

        let TaskOutcome::Linted(outcome) = runner.run(Path::new("c.js"), Ok("var c = 1\n".into()))
        else {
            panic!("Expected a linted outcome");
        };

        assert_eq!(outcome.result, FileResult::clean("c.js", false));
        assert_eq!(
            outcome.write_failure.map(|f| f.kind),
            Some(FailureKind::Write)
        );
        assert_eq!(io.reports().len(), 1);
    }

    #[test]
    fn test_run_batch_keeps_report_order() {
        let adapter = EngineKind::EslintLegacy.adapter(backend(json!({
            "results": [
                {
                    "filePath": "a.js",
                    "messages": [{ "message": "unexpected token", "severity": 2, "line": 3, "column": 5 }],
                    "errorCount": 1
                },
                { "filePath": "b.js", "messages": [], "errorCount": 0 }
            ]
        })));
        let io = MemoryIo::new();
        let options = json!({});
        let runner = FileTaskRunner::new(adapter.as_ref(), &io, &options, true);

        let outcomes = runner.run_batch(&[PathBuf::from("a.js"), PathBuf::from("b.js")]);

        let results: Vec<_> = outcomes
            .iter()
            .map(|outcome| match outcome {
                TaskOutcome::Linted(linted) => linted.result.clone(),
                TaskOutcome::Failed(failure) => panic!("Unexpected failure: {failure}"),
            })
            .collect();
        assert_eq!(
            results,
            vec![FileResult::unclean("a.js"), FileResult::clean("b.js", false)]
        );
        let TaskOutcome::Linted(first) = &outcomes[0] else {
            unreachable!()
        };
        assert_eq!(first.problems[0].severity, Severity::Error);
    }

    #[test]
    fn test_run_batch_input_left_out_of_report() {
        let adapter = EngineKind::EslintLegacy.adapter(backend(json!({
            "results": [{ "filePath": "/work/a.js", "messages": [], "errorCount": 0 }]
        })));
        let io = MemoryIo::new();
        let options = json!({});
        let runner = FileTaskRunner::new(adapter.as_ref(), &io, &options, true);

        let outcomes = runner.run_batch(&[PathBuf::from("a.js"), PathBuf::from("b.js")]);

        assert_eq!(outcomes.len(), 2);
        assert!(matches!(&outcomes[0], TaskOutcome::Linted(linted) if linted.result.is_clean()));
        let TaskOutcome::Failed(failure) = &outcomes[1] else {
            panic!("Expected a failed outcome");
        };
        assert_eq!(failure.path, PathBuf::from("b.js"));
        assert_eq!(failure.kind, FailureKind::Engine);
        assert_eq!(
            io.reports(),
            vec!["Failed to lint b.js: Engine report has no entry for b.js"]
        );
    }

    #[test]
    fn test_run_batch_engine_failure() {
        let adapter = EngineKind::EslintLegacy.adapter(failing_backend());
        let io = MemoryIo::new();
        let options = json!({});
        let runner = FileTaskRunner::new(adapter.as_ref(), &io, &options, true);

        let outcomes = runner.run_batch(&[PathBuf::from("a.js"), PathBuf::from("b.js")]);

        assert_eq!(outcomes.len(), 2);
        assert!(
            outcomes
                .iter()
                .all(|o| matches!(o, TaskOutcome::Failed(f) if f.kind == FailureKind::Engine))
        );
        // One side-channel message for the single failed invocation.
        assert_eq!(io.reports().len(), 1);
        assert!(io.reports()[0].starts_with("ESLint (legacy) failed"));
    }
}

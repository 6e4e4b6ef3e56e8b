//! Engine backends.
//!
//! A backend is the external engine itself: it receives a request and returns
//! the engine-native JSON report. `CommandBackend` runs a configured program;
//! any `Fn(&EngineRequest) -> Result<Value, EngineError>` is also a backend.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde_json::Value;
use tracing::{debug, warn};

use crate::{EngineError, EngineKind};

/// One invocation of an engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineRequest<'a> {
    /// The engine being invoked.
    pub kind: EngineKind,
    /// Ordered paths to lint. A single element for per-file engines.
    pub paths: &'a [PathBuf],
    /// Already-read source text. `None` when the engine reads its own inputs.
    pub source: Option<&'a str>,
    /// Engine options, forwarded verbatim.
    pub options: &'a Value,
}

impl<'a> EngineRequest<'a> {
    pub fn new(kind: EngineKind, paths: &'a [PathBuf], options: &'a Value) -> Self {
        Self {
            kind,
            paths,
            source: None,
            options,
        }
    }

    /// Attaches already-read source text.
    pub fn with_source(mut self, source: Option<&'a str>) -> Self {
        self.source = source;
        self
    }

    /// Paths as a JSON array of strings.
    pub fn paths_json(&self) -> Value {
        Value::Array(
            self.paths
                .iter()
                .map(|p| Value::String(p.display().to_string()))
                .collect(),
        )
    }
}

/// Trait for running an engine.
pub trait EngineBackend: Send + Sync {
    /// Runs the engine and returns its native JSON report.
    fn invoke(&self, request: &EngineRequest<'_>) -> Result<Value, EngineError>;
}

impl<F> EngineBackend for F
where
    F: Fn(&EngineRequest<'_>) -> Result<Value, EngineError> + Send + Sync,
{
    fn invoke(&self, request: &EngineRequest<'_>) -> Result<Value, EngineError> {
        self(request)
    }
}

/// Runs an engine as a child process.
///
/// The child is called as `<program> <args…> <paths JSON> <options JSON>`.
/// Source text, when present, is written to its stdin. Its stdout must hold a
/// single JSON document. A non-zero exit status alone is not treated as a
/// failure since engines report problems that way.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl CommandBackend {
    /// Creates a backend running `program` with no extra arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Appends one argument placed before the paths and options.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments placed before the paths and options.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets the working directory of the child.
    pub fn current_dir(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn build_command(&self, request: &EngineRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(request.paths_json().to_string())
            .arg(request.options.to_string());

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd.stdin(if request.source.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }
}

impl EngineBackend for CommandBackend {
    fn invoke(&self, request: &EngineRequest<'_>) -> Result<Value, EngineError> {
        debug!(
            "Running {} via '{}' on {} file(s)",
            request.kind.display_name(),
            self.program,
            request.paths.len()
        );

        let mut child = self
            .build_command(request)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from its own thread so a chatty child cannot deadlock
        // against a full stdout pipe.
        let stdin = child.stdin.take();
        let output = std::thread::scope(|scope| {
            let writer = match (stdin, request.source) {
                (Some(mut stdin), Some(source)) => {
                    Some(scope.spawn(move || stdin.write_all(source.as_bytes())))
                }
                _ => None,
            };

            let output = child.wait_with_output();

            if let Some(writer) = writer {
                match writer.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                        debug!("Engine '{}' closed stdin early", self.program);
                    }
                    Ok(Err(e)) => warn!("Failed to write source to '{}': {}", self.program, e),
                    Err(_) => warn!("Stdin writer for '{}' panicked", self.program),
                }
            }

            output
        })
        .map_err(|source| EngineError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let trimmed = stdout.trim();

        if trimmed.is_empty() {
            return Err(EngineError::output(
                &self.program,
                format!("no report on stdout ({})", output.status),
                stderr,
            ));
        }

        serde_json::from_str(trimmed).map_err(|e| {
            EngineError::output(&self.program, format!("report is not JSON: {}", e), stderr)
        })
    }
}

//! Engine error types.

use thiserror::Error;

/// Errors that can occur while running an engine or reading its report.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be started.
    #[error("Failed to start engine '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but its output is not a usable report.
    #[error("Engine '{program}' produced unusable output: {message}{}", stderr_note(.stderr))]
    Output {
        program: String,
        message: String,
        stderr: String,
    },

    /// The report is JSON but does not have the engine's native shape.
    #[error("Malformed {engine} report: {source}")]
    Malformed {
        engine: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The batch report has no entry for a requested file.
    #[error("Engine report has no entry for {0}")]
    MissingReport(String),

    /// The engine selector names no known engine.
    #[error("Unknown engine: {0}")]
    UnknownEngine(String),
}

fn stderr_note(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr)
    }
}

impl EngineError {
    /// Creates an output error.
    pub fn output(
        program: impl Into<String>,
        message: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::Output {
            program: program.into(),
            message: message.into(),
            stderr: stderr.into(),
        }
    }

    /// Creates a malformed-report error.
    pub fn malformed(engine: &'static str, source: serde_json::Error) -> Self {
        Self::Malformed { engine, source }
    }
}

//! Bridge error types.

use thiserror::Error;

use crate::coordinator::CoordinatorError;
use crate::framing::FramingError;

/// Errors that abort a whole run.
///
/// Failures that concern a single file are not errors; they are recorded as
/// [`FileFailure`](crate::FileFailure) values and the run continues.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The output channel rejected a write.
    #[error("Output error: {0}")]
    Output(String),

    /// Completion counting went wrong.
    #[error("Coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<FramingError> for BridgeError {
    fn from(e: FramingError) -> Self {
        Self::Output(e.to_string())
    }
}

//! # lintbridge_core
//!
//! Lint orchestration and result streaming for lintbridge.
//!
//! This crate provides:
//! - The `Orchestrator` that dispatches file tasks and finalizes the output
//! - Configuration loading
//! - The `HostIo` port through which all I/O flows
//! - Completion counting and the two output framings
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lintbridge_core::{LintRequest, LintbridgeConfig, Orchestrator, RunSettings, SystemIo};
//!
//! let config = LintbridgeConfig::from_file(".lintbridge.jsonc")?;
//! let orchestrator = Orchestrator::new(
//!     Arc::new(SystemIo::new()),
//!     Arc::new(config.backend()),
//!     RunSettings::from_config(&config),
//! );
//!
//! let request = LintRequest::new(config.engine, paths).with_options(config.options.clone());
//! let summary = orchestrator.run(&request).await?;
//! ```

mod config;
pub mod coordinator;
mod error;
mod file_task;
pub mod framing;
mod io;
mod orchestrator;
mod result;
mod streamer;

pub use config::{CommandConfig, Framing, LintbridgeConfig, Ordering};
pub use coordinator::{Completion, CompletionCoordinator, CoordinatorError, TaskTicket};
pub use error::BridgeError;
pub use file_task::{FileOutcome, FileTaskRunner, TaskOutcome};
pub use framing::{BATCH_SENTINEL, FramingError, JsonArrayWriter};
pub use io::{BoxFuture, HostIo, MemoryIo, SystemIo};
pub use orchestrator::{LintRequest, Orchestrator, RunSettings};
pub use result::{Envelope, FailureKind, FileFailure, FileResult, FileStatus, RunSummary};
pub use streamer::Streamer;

pub use lintbridge_engine::{EngineKind, Problem, Severity};

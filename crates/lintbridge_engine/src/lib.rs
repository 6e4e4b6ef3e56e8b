//! # lintbridge_engine
//!
//! Engine adapters for lintbridge.
//!
//! This crate provides:
//! - The canonical `Problem` and `Severity` types
//! - The `EngineAdapter` capability shared by every supported engine
//! - Concrete adapters for ESLint (legacy and current), JSHint and JSLint
//! - The `EngineBackend` seam that actually runs an engine
//!
//! ## Architecture
//!
//! Engines are external tools. An adapter never analyzes source itself: it
//! hands a request to its backend, receives the engine-native JSON report and
//! normalizes it. The default backend spawns a configured command; any closure
//! with the right signature can stand in for it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lintbridge_engine::{CommandBackend, EngineKind};
//!
//! let backend = Arc::new(CommandBackend::new("node").arg("jshint-shim.js"));
//! let adapter = EngineKind::Jshint.adapter(backend);
//!
//! let output = adapter.lint(path, Some(source), &options)?;
//! ```

mod adapter;
mod backend;
mod diagnostic;
mod error;
pub mod eslint;
pub mod eslint_legacy;
pub mod jshint;
pub mod jslint;

pub use adapter::{BatchEntry, EngineAdapter, EngineKind, EngineOutput, ExecutionShape};
pub use backend::{CommandBackend, EngineBackend, EngineRequest};
pub use diagnostic::{Problem, Severity};
pub use error::EngineError;

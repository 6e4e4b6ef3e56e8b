//! Lint orchestration.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use lintbridge_engine::{EngineBackend, EngineKind, ExecutionShape};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::coordinator::{Completion, CompletionCoordinator, TaskTicket};
use crate::file_task::FileTaskRunner;
use crate::io::HostIo;
use crate::streamer::Streamer;
use crate::{BridgeError, Framing, LintbridgeConfig, Ordering, RunSummary};

/// One invocation: which files, which engine, which options.
#[derive(Debug, Clone, PartialEq)]
pub struct LintRequest {
    /// Files to lint. Order is significant.
    pub paths: Vec<PathBuf>,
    /// Engine options, forwarded verbatim.
    pub options: Value,
    pub engine: EngineKind,
}

impl LintRequest {
    pub fn new(engine: EngineKind, paths: Vec<PathBuf>) -> Self {
        Self {
            paths,
            options: Value::Object(serde_json::Map::new()),
            engine,
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }
}

/// How results are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    pub framing: Framing,
    pub ordering: Ordering,
    /// Write autofixed source back to disk.
    pub fix: bool,
}

impl RunSettings {
    pub fn from_config(config: &LintbridgeConfig) -> Self {
        Self {
            framing: config.framing(),
            ordering: config.ordering,
            fix: config.fix,
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            framing: Framing::Batch,
            ordering: Ordering::default(),
            fix: true,
        }
    }
}

/// A finished read, sent back from its task.
struct ReadCompletion {
    ticket: TaskTicket,
    path: PathBuf,
    read: io::Result<String>,
}

/// Drives one lint run from dispatch to the final output write.
///
/// Reads are the only work done off the orchestrator loop. Engine calls,
/// normalization and output writes all happen on it, one outcome at a time.
pub struct Orchestrator {
    io: Arc<dyn HostIo>,
    backend: Arc<dyn EngineBackend>,
    settings: RunSettings,
}

impl Orchestrator {
    pub fn new(
        io: Arc<dyn HostIo>,
        backend: Arc<dyn EngineBackend>,
        settings: RunSettings,
    ) -> Self {
        Self {
            io,
            backend,
            settings,
        }
    }

    /// Lints every requested file and writes the framed output.
    ///
    /// Per-file failures are reported on the side channel and counted in the
    /// summary. Only output-channel failures abort the run.
    ///
    /// Must be called within a tokio runtime.
    pub async fn run(&self, request: &LintRequest) -> Result<RunSummary, BridgeError> {
        let adapter = request.engine.adapter(Arc::clone(&self.backend));
        let runner = FileTaskRunner::new(
            adapter.as_ref(),
            self.io.as_ref(),
            &request.options,
            self.settings.fix,
        );
        let mut streamer = Streamer::new(
            self.io.as_ref(),
            self.settings.framing,
            self.settings.ordering,
        );

        info!(
            "Linting {} file(s) with {}",
            request.paths.len(),
            request.engine.display_name()
        );

        streamer.begin()?;
        match adapter.shape() {
            ExecutionShape::Batch => {
                // The engine reads its own inputs, so nothing is dispatched
                // and the run completes as soon as the report is in.
                let outcomes = runner.run_batch(&request.paths);
                for (index, outcome) in outcomes.into_iter().enumerate() {
                    streamer.accept(index, outcome)?;
                }
            }
            ExecutionShape::PerFile => {
                self.run_per_file(&runner, &mut streamer, &request.paths)
                    .await?;
            }
        }

        let summary = streamer.finish()?;
        debug!(
            "Run finished: {} result(s), {} problem(s), {} failure(s)",
            summary.results,
            summary.problems,
            summary.failures.len()
        );
        Ok(summary)
    }

    async fn run_per_file(
        &self,
        runner: &FileTaskRunner<'_>,
        streamer: &mut Streamer<'_>,
        paths: &[PathBuf],
    ) -> Result<(), BridgeError> {
        let (mut coordinator, tickets) = CompletionCoordinator::new(paths.len());
        let (tx, mut rx) = mpsc::unbounded_channel();

        for (ticket, path) in tickets.into_iter().zip(paths) {
            let io = Arc::clone(&self.io);
            let tx = tx.clone();
            let path = path.clone();
            tokio::spawn(async move {
                let read = io.read_to_string(&path).await;
                if tx.send(ReadCompletion { ticket, path, read }).is_err() {
                    debug!("Run ended before a read completed");
                }
            });
        }
        drop(tx);

        while !coordinator.is_finished() {
            let Some(ReadCompletion { ticket, path, read }) = rx.recv().await else {
                return Err(BridgeError::Internal(format!(
                    "{} file task(s) ended without reporting",
                    coordinator.remaining()
                )));
            };

            let index = ticket.index();
            streamer.accept(index, runner.run(&path, read))?;

            match coordinator.complete(ticket)? {
                Completion::Finished => debug!("All {} file task(s) settled", paths.len()),
                Completion::Pending { remaining } => {
                    debug!("{} settled, {} remaining", path.display(), remaining)
                }
            }
        }

        Ok(())
    }
}

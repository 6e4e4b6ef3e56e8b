//! Aggregator/Streamer.
//!
//! Collects per-file outcomes and writes them to the output channel under the
//! configured framing. Outcomes are accepted in completion order and, with
//! [`Ordering::Input`], held back until every earlier input has settled.

use std::collections::BTreeMap;

use tracing::debug;

use crate::file_task::{FileOutcome, TaskOutcome};
use crate::framing::{JsonArrayWriter, write_batch};
use crate::io::{HostIo, HostStdout};
use crate::{BridgeError, Envelope, Framing, Ordering, RunSummary};

/// Holds outcomes until all lower input indices have settled.
#[derive(Debug, Default)]
pub(crate) struct ReorderBuffer {
    next: usize,
    pending: BTreeMap<usize, TaskOutcome>,
}

impl ReorderBuffer {
    /// Accepts the outcome for `index` and returns whatever is now releasable,
    /// in input order.
    pub(crate) fn push(&mut self, index: usize, outcome: TaskOutcome) -> Vec<TaskOutcome> {
        self.pending.insert(index, outcome);

        let mut released = Vec::new();
        while let Some(outcome) = self.pending.remove(&self.next) {
            released.push(outcome);
            self.next += 1;
        }
        released
    }

    /// Releases anything left, in index order.
    pub(crate) fn drain(&mut self) -> Vec<TaskOutcome> {
        std::mem::take(&mut self.pending).into_values().collect()
    }
}

enum Sink<'a> {
    Batch {
        io: &'a dyn HostIo,
        envelope: Envelope,
    },
    Legacy {
        writer: JsonArrayWriter<HostStdout<'a>>,
    },
}

/// Streams outcomes to the output channel.
pub struct Streamer<'a> {
    sink: Sink<'a>,
    reorder: Option<ReorderBuffer>,
    summary: RunSummary,
}

impl<'a> Streamer<'a> {
    pub fn new(io: &'a dyn HostIo, framing: Framing, ordering: Ordering) -> Self {
        let sink = match framing {
            Framing::Batch => Sink::Batch {
                io,
                envelope: Envelope::default(),
            },
            Framing::Legacy => Sink::Legacy {
                writer: JsonArrayWriter::new(HostStdout::new(io)),
            },
        };
        let reorder = (ordering == Ordering::Input).then(ReorderBuffer::default);

        Self {
            sink,
            reorder,
            summary: RunSummary::default(),
        }
    }

    /// Opens the stream. Only the legacy framing writes anything here.
    pub fn begin(&mut self) -> Result<(), BridgeError> {
        if let Sink::Legacy { writer } = &mut self.sink {
            writer.begin_array()?;
        }
        Ok(())
    }

    /// Accepts the outcome of the task at input position `index`.
    pub fn accept(&mut self, index: usize, outcome: TaskOutcome) -> Result<(), BridgeError> {
        let released = match &mut self.reorder {
            Some(buffer) => buffer.push(index, outcome),
            None => vec![outcome],
        };
        for outcome in released {
            self.emit(outcome)?;
        }
        Ok(())
    }

    /// Closes the stream and returns the run summary.
    pub fn finish(mut self) -> Result<RunSummary, BridgeError> {
        if let Some(mut buffer) = self.reorder.take() {
            for outcome in buffer.drain() {
                self.emit(outcome)?;
            }
        }

        match &mut self.sink {
            Sink::Batch { io, envelope } => {
                debug!(
                    "Writing envelope with {} result(s) and {} problem(s)",
                    envelope.results.len(),
                    envelope.problems.len()
                );
                write_batch(&mut HostStdout::new(*io), &*envelope)?;
            }
            Sink::Legacy { writer } => writer.end_array()?,
        }

        Ok(self.summary)
    }

    fn emit(&mut self, outcome: TaskOutcome) -> Result<(), BridgeError> {
        let FileOutcome {
            result,
            problems,
            diagnostics,
            write_failure,
        } = match outcome {
            TaskOutcome::Linted(linted) => linted,
            TaskOutcome::Failed(failure) => {
                self.summary.failures.push(failure);
                return Ok(());
            }
        };

        self.summary.results += 1;
        self.summary.problems += problems.len();
        if !result.is_clean() {
            self.summary.unclean += 1;
        }
        if let Some(failure) = write_failure {
            self.summary.failures.push(failure);
        }

        match &mut self.sink {
            Sink::Batch { envelope, .. } => {
                envelope.results.push(result);
                envelope.problems.extend(problems);
            }
            Sink::Legacy { writer } => {
                if !diagnostics.is_empty() {
                    writer.write_element(&(&result.source, &diagnostics))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FailureKind, FileFailure, FileResult, MemoryIo};
    use lintbridge_engine::Problem;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn linted(source: &str, diagnostics: Vec<Value>) -> TaskOutcome {
        let problems = diagnostics
            .iter()
            .map(|_| Problem::new(source, "problem"))
            .collect();
        let result = if diagnostics.is_empty() {
            FileResult::clean(source, false)
        } else {
            FileResult::unclean(source)
        };
        TaskOutcome::Linted(FileOutcome {
            result,
            problems,
            diagnostics,
            write_failure: None,
        })
    }

    fn failed(source: &str) -> TaskOutcome {
        TaskOutcome::Failed(FileFailure::new(source, FailureKind::Read, "gone"))
    }

    fn sources(outcomes: &[TaskOutcome]) -> Vec<String> {
        outcomes
            .iter()
            .map(|outcome| match outcome {
                TaskOutcome::Linted(linted) => linted.result.source.clone(),
                TaskOutcome::Failed(failure) => failure.path.display().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_reorder_buffer_releases_in_input_order() {
        let mut buffer = ReorderBuffer::default();

        assert!(buffer.push(2, linted("c.js", vec![])).is_empty());
        assert!(buffer.push(1, failed("b.js")).is_empty());
        assert_eq!(
            sources(&buffer.push(0, linted("a.js", vec![]))),
            vec!["a.js", "b.js", "c.js"]
        );
        assert!(buffer.drain().is_empty());
    }

    #[test]
    fn test_batch_envelope() {
        let io = MemoryIo::new();
        let mut streamer = Streamer::new(&io, Framing::Batch, Ordering::Completion);
        streamer.begin().unwrap();
        streamer
            .accept(1, linted("b.js", vec![json!({ "id": "(error)" })]))
            .unwrap();
        streamer.accept(0, linted("a.js", vec![])).unwrap();
        assert!(io.stdout().is_empty());

        let summary = streamer.finish().unwrap();

        let out = io.stdout();
        assert_eq!(out[0], 0x10);
        let envelope: Envelope = serde_json::from_slice(&out[1..]).unwrap();
        assert_eq!(
            envelope.results,
            vec![FileResult::unclean("b.js"), FileResult::clean("a.js", false)]
        );
        assert_eq!(envelope.problems.len(), 1);
        assert_eq!(summary.results, 2);
        assert_eq!(summary.unclean, 1);
        assert_eq!(io.stdout_chunks().len(), 1);
    }

    #[test]
    fn test_batch_input_ordering() {
        let io = MemoryIo::new();
        let mut streamer = Streamer::new(&io, Framing::Batch, Ordering::Input);
        streamer.accept(1, linted("b.js", vec![])).unwrap();
        streamer.accept(0, linted("a.js", vec![])).unwrap();
        streamer.finish().unwrap();

        let envelope: Envelope = serde_json::from_slice(&io.stdout()[1..]).unwrap();
        let order: Vec<_> = envelope.results.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(order, vec!["a.js", "b.js"]);
    }

    #[test]
    fn test_legacy_stream_skips_clean_files() {
        let io = MemoryIo::new();
        let mut streamer = Streamer::new(&io, Framing::Legacy, Ordering::Completion);
        streamer.begin().unwrap();
        streamer
            .accept(0, linted("a.js", vec![json!({ "reason": "x" })]))
            .unwrap();
        streamer.accept(1, linted("b.js", vec![])).unwrap();
        streamer.accept(2, failed("missing.js")).unwrap();
        streamer
            .accept(3, linted("d.js", vec![json!({ "reason": "y" })]))
            .unwrap();
        let summary = streamer.finish().unwrap();

        assert_eq!(
            io.stdout_chunks(),
            vec![
                b"[\n".to_vec(),
                b"[\"a.js\",[{\"reason\":\"x\"}]]\n".to_vec(),
                b",\n".to_vec(),
                b"[\"d.js\",[{\"reason\":\"y\"}]]\n".to_vec(),
                b"]\n".to_vec(),
            ]
        );
        let parsed: Value = serde_json::from_str(&io.stdout_string()).unwrap();
        assert_eq!(
            parsed,
            json!([["a.js", [{ "reason": "x" }]], ["d.js", [{ "reason": "y" }]]])
        );
        assert_eq!(summary.failures_of(FailureKind::Read), 1);
    }

    #[test]
    fn test_legacy_stream_empty() {
        let io = MemoryIo::new();
        let mut streamer = Streamer::new(&io, Framing::Legacy, Ordering::Input);
        streamer.begin().unwrap();
        streamer.finish().unwrap();

        assert_eq!(io.stdout_string(), "[\n]\n");
    }

    #[test]
    fn test_output_failure_is_fatal() {
        let io = MemoryIo::new().with_broken_stdout();
        let mut streamer = Streamer::new(&io, Framing::Batch, Ordering::Completion);
        streamer.accept(0, linted("a.js", vec![])).unwrap();

        let err = streamer.finish().unwrap_err();
        assert!(matches!(err, BridgeError::Output(_)));
    }
}

//! Completion counting for dispatched file tasks.

use thiserror::Error;

/// Errors raised when a task reports completion incorrectly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("Task {0} already reported completion")]
    AlreadyCompleted(usize),

    #[error("Task {index} was never dispatched (only {issued} tasks exist)")]
    UnknownTask { index: usize, issued: usize },
}

/// Proof that a task was dispatched. Consumed on completion.
#[derive(Debug, PartialEq, Eq)]
pub struct TaskTicket {
    index: usize,
}

impl TaskTicket {
    /// Position of the task in dispatch order.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Outcome of recording one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Tasks are still outstanding.
    Pending { remaining: usize },
    /// This completion was the last one.
    Finished,
}

/// Countdown over dispatched tasks.
///
/// Reaches zero exactly once. A coordinator created for zero tasks is
/// finished from the start.
#[derive(Debug)]
pub struct CompletionCoordinator {
    completed: Vec<bool>,
    remaining: usize,
}

impl CompletionCoordinator {
    /// Creates a coordinator for `tasks` tasks along with one ticket each.
    pub fn new(tasks: usize) -> (Self, Vec<TaskTicket>) {
        let coordinator = Self {
            completed: vec![false; tasks],
            remaining: tasks,
        };
        let tickets = (0..tasks).map(|index| TaskTicket { index }).collect();
        (coordinator, tickets)
    }

    /// Records the completion of the task holding `ticket`.
    pub fn complete(&mut self, ticket: TaskTicket) -> Result<Completion, CoordinatorError> {
        let issued = self.completed.len();
        let slot = self
            .completed
            .get_mut(ticket.index)
            .ok_or(CoordinatorError::UnknownTask {
                index: ticket.index,
                issued,
            })?;

        if *slot {
            return Err(CoordinatorError::AlreadyCompleted(ticket.index));
        }
        *slot = true;
        self.remaining -= 1;

        Ok(if self.remaining == 0 {
            Completion::Finished
        } else {
            Completion::Pending {
                remaining: self.remaining,
            }
        })
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_finished(&self) -> bool {
        self.remaining == 0
    }
}

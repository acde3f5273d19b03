//! Typed task event channel.
//!
//! Surrounding systems (animation selection, AI) learn what a ped is doing
//! purely from these notifications; the engine makes no calls into rendering
//! code. Delivery is synchronous and ordered: a state change is always
//! emitted before the completion that caused it.

use crate::kinds::complex::TaskPhase;
use crate::task::{TaskResult, TaskStatus};

/// Notification emitted by a task as it moves through its lifecycle.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TaskEvent {
    /// The task left Idle and began starting up.
    Started,
    /// The lifecycle state changed. Emitted on every transition.
    StateChanged { from: TaskStatus, to: TaskStatus },
    /// A complex task advanced to its next phase.
    PhaseChanged { from: TaskPhase, to: TaskPhase },
    /// The task reached a terminal state. Emitted exactly once per task.
    Completed { result: TaskResult },
}

/// Synchronous receiver for task events.
///
/// Callbacks complete before the engine proceeds, so delivery order always
/// matches emission order.
pub trait EventSink {
    fn emit(&mut self, event: TaskEvent);
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: TaskEvent) {}
}

/// Sink that records events in order.
///
/// Used by tests and by consumers that drain notifications once per tick.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<TaskEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `Completed` notifications seen so far.
    pub fn completions(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TaskEvent::Completed { .. }))
            .count()
    }

    pub fn drain(&mut self) -> Vec<TaskEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: TaskEvent) {
        self.events.push(event);
    }
}

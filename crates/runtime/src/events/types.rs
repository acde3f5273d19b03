//! Typed event payloads published on the bus.

use serde::{Deserialize, Serialize};

use ped_core::{PedId, TaskEvent};

/// A core task notification tagged with the ped it concerns.
///
/// Consumers (animation selection, AI observers) key off the ped; the inner
/// event carries the transition or result detail.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TaskNotification {
    pub ped: PedId,
    pub event: TaskEvent,
}

/// Scheduler-level events.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SchedulerEvent {
    /// One full pass over every registered ped finished.
    TickCompleted { tick: u64, active_peds: usize },
    PedRegistered { ped: PedId },
    PedRemoved { ped: PedId },
}

//! Per-invocation execution context.

use crate::events::{EventSink, TaskEvent};
use crate::state::PedState;
use crate::world::WorldEnv;

/// Everything a task may touch during a lifecycle call.
///
/// The owning ped's state is the only mutable world data; targets and
/// geometry are reached read-only through the world environment. The sink
/// receives notifications synchronously, in emission order.
pub struct TaskContext<'a> {
    pub ped: &'a mut PedState,
    pub world: WorldEnv<'a>,
    pub events: &'a mut dyn EventSink,
}

impl<'a> TaskContext<'a> {
    pub fn new(ped: &'a mut PedState, world: WorldEnv<'a>, events: &'a mut dyn EventSink) -> Self {
        Self { ped, world, events }
    }

    pub fn emit(&mut self, event: TaskEvent) {
        self.events.emit(event);
    }
}

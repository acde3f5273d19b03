//! Topic-based event routing for task notifications.
mod bus;
mod types;

pub use bus::{BusSink, Event, EventBus, Topic};
pub use types::{SchedulerEvent, TaskNotification};

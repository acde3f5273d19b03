//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use tokio::sync::broadcast;

use ped_core::{EventSink, PedId, TaskEvent};

use super::types::{SchedulerEvent, TaskNotification};

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Task lifecycle transitions and completions.
    Lifecycle,
    /// Complex-task phase changes.
    Phase,
    /// Scheduler bookkeeping.
    Scheduler,
}

/// Event wrapper that carries the topic and typed event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Event {
    Task(TaskNotification),
    Scheduler(SchedulerEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Task(notification) => match notification.event {
                TaskEvent::PhaseChanged { .. } => Topic::Phase,
                _ => Topic::Lifecycle,
            },
            Event::Scheduler(_) => Topic::Scheduler,
        }
    }
}

/// Topic-based event bus.
///
/// Consumers subscribe to specific topics and only receive events they care
/// about. Publishing is best-effort: with no subscribers the event is simply
/// dropped.
pub struct EventBus {
    channels: Arc<RwLock<HashMap<Topic, broadcast::Sender<Event>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with the given capacity per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut channels = HashMap::new();
        channels.insert(Topic::Lifecycle, broadcast::channel(capacity).0);
        channels.insert(Topic::Phase, broadcast::channel(capacity).0);
        channels.insert(Topic::Scheduler, broadcast::channel(capacity).0);

        Self {
            channels: Arc::new(RwLock::new(channels)),
        }
    }

    /// Publish an event to its corresponding topic.
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        match self.channels.read() {
            Ok(channels) => {
                if let Some(tx) = channels.get(&topic)
                    && tx.send(event).is_err()
                {
                    // No subscribers for this topic; normal, not an error.
                    tracing::trace!("no subscribers for topic {:?}", topic);
                }
            }
            Err(_) => {
                tracing::debug!("event bus lock poisoned; dropping event for {:?}", topic);
            }
        }
    }

    /// Subscribe to a specific topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        let channels = self.channels.read().expect("event bus lock poisoned");
        channels
            .get(&topic)
            .expect("topic channel not initialized")
            .subscribe()
    }

    /// Subscribe to multiple topics at once.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Synchronous sink that forwards core task events onto the bus, tagged with
/// the ped being ticked.
pub struct BusSink<'a> {
    ped: PedId,
    bus: &'a EventBus,
}

impl<'a> BusSink<'a> {
    pub fn new(ped: PedId, bus: &'a EventBus) -> Self {
        Self { ped, bus }
    }
}

impl EventSink for BusSink<'_> {
    fn emit(&mut self, event: TaskEvent) {
        self.bus.publish(Event::Task(TaskNotification {
            ped: self.ped,
            event,
        }));
    }
}

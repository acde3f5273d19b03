//! Runtime orchestration for the ped task engine.
//!
//! This crate wires the synchronous `ped-core` engine into a running game
//! loop: the [`scheduler::Scheduler`] worker owns ped states and their task
//! managers and ticks them at a fixed interval, commands flow in through
//! [`scheduler::SchedulerHandle`], and task notifications flow out through
//! the topic-based [`events::EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`scheduler`] hosts the worker, its commands, and the handle
//! - [`events`] provides the topic-based event bus
//! - [`error`] defines the runtime error type
pub mod error;
pub mod events;
pub mod scheduler;

pub use error::{Result, RuntimeError};
pub use events::{BusSink, Event, EventBus, SchedulerEvent, TaskNotification, Topic};
pub use scheduler::{Command, PedReport, Scheduler, SchedulerConfig, SchedulerHandle};

//! Shared identity and state types for the task engine.
mod common;
mod ped;

pub use common::{PedId, ResourceMeter, TaskId};
pub use ped::{PedState, Posture};

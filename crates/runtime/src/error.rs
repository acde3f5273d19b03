//! Runtime orchestration errors.

use ped_core::PedId;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// No ped with this handle is registered with the scheduler.
    #[error("ped {0} is not registered")]
    UnknownPed(PedId),

    /// A ped with this handle is already registered.
    #[error("ped {0} is already registered")]
    PedAlreadyRegistered(PedId),

    /// The scheduler worker is gone; commands can no longer be delivered.
    #[error("scheduler channel closed")]
    ChannelClosed,
}

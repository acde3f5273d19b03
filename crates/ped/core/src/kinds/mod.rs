//! Behavior families as a closed sum type.
//!
//! Rather than a class hierarchy, every behavior is a variant of
//! [`TaskKind`]: the shared lifecycle machine lives in [`crate::task`], and
//! per-family logic is dispatched here by `match`. Each family module defines
//! its variants and their parameters; all of them speak to the lifecycle
//! through the same five hooks (initialize / execute / update / validate /
//! cleanup).

pub mod complex;
pub mod oneshot;
pub mod wild;

use crate::task::{TaskContext, TaskFamily, TaskState};

pub use complex::{ComplexTask, TaskPhase};
pub use oneshot::OneShotTask;
pub use wild::{CycleState, WildTask};

/// What a kind reports back from an execution step.
#[derive(Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// Keep running.
    Continue,
    /// Terminate with the given verdict; the lifecycle machine turns this
    /// into the matching terminal state and result record.
    Complete { success: bool, message: String },
}

impl TickOutcome {
    pub fn done(message: impl Into<String>) -> Self {
        Self::Complete {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Complete {
            success: false,
            message: message.into(),
        }
    }
}

/// Every concrete behavior the engine can run.
///
/// The class is fixed at construction and doubles as the factory registry
/// key; `describe` feeds the default task description.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TaskClass {
    Aim,
    LookAt,
    Turn,
    Shimmy,
    DropDown,
    Jump,
    MoveTowards,
    Climb,
    EnterVehicle,
    GrabLedge,
    ClimbLadder,
    FightAgainst,
    CombatTargets,
}

impl TaskClass {
    pub const ALL: [TaskClass; 13] = [
        TaskClass::Aim,
        TaskClass::LookAt,
        TaskClass::Turn,
        TaskClass::Shimmy,
        TaskClass::DropDown,
        TaskClass::Jump,
        TaskClass::MoveTowards,
        TaskClass::Climb,
        TaskClass::EnterVehicle,
        TaskClass::GrabLedge,
        TaskClass::ClimbLadder,
        TaskClass::FightAgainst,
        TaskClass::CombatTargets,
    ];

    pub const fn family(self) -> TaskFamily {
        match self {
            TaskClass::Aim
            | TaskClass::LookAt
            | TaskClass::Turn
            | TaskClass::Shimmy
            | TaskClass::DropDown
            | TaskClass::Jump
            | TaskClass::MoveTowards => TaskFamily::OneShot,
            TaskClass::Climb
            | TaskClass::EnterVehicle
            | TaskClass::GrabLedge
            | TaskClass::ClimbLadder => TaskFamily::Complex,
            TaskClass::FightAgainst | TaskClass::CombatTargets => TaskFamily::WildComplex,
        }
    }

    /// Whether a target handle must be bound at construction.
    ///
    /// `Aim` is special-cased by the factory: an explicit direction waives
    /// the requirement.
    pub const fn requires_target(self) -> bool {
        match self {
            TaskClass::Aim | TaskClass::EnterVehicle | TaskClass::FightAgainst => true,
            TaskClass::LookAt
            | TaskClass::Turn
            | TaskClass::Shimmy
            | TaskClass::DropDown
            | TaskClass::Jump
            | TaskClass::MoveTowards
            | TaskClass::Climb
            | TaskClass::GrabLedge
            | TaskClass::ClimbLadder
            | TaskClass::CombatTargets => false,
        }
    }

    pub const fn describe(self) -> &'static str {
        match self {
            TaskClass::Aim => "aim at a target or direction",
            TaskClass::LookAt => "turn the head and torso toward a point of interest",
            TaskClass::Turn => "turn the body toward a rotation or direction",
            TaskClass::Shimmy => "side-step along a ledge",
            TaskClass::DropDown => "drop from a ledge hold",
            TaskClass::Jump => "jump toward a landing point",
            TaskClass::MoveTowards => "walk or run straight toward a location",
            TaskClass::Climb => "climb over an obstacle",
            TaskClass::EnterVehicle => "approach and enter a vehicle seat",
            TaskClass::GrabLedge => "grab a ledge and hold on",
            TaskClass::ClimbLadder => "traverse a ladder",
            TaskClass::FightAgainst => "fight a single opponent",
            TaskClass::CombatTargets => "engage multiple combat targets",
        }
    }
}

/// The three behavior families wrapped as one dispatchable kind.
#[derive(Clone, Debug)]
pub enum TaskKind {
    OneShot(OneShotTask),
    Complex(ComplexTask),
    Wild(WildTask),
}

impl TaskKind {
    pub fn family(&self) -> TaskFamily {
        match self {
            TaskKind::OneShot(_) => TaskFamily::OneShot,
            TaskKind::Complex(_) => TaskFamily::Complex,
            TaskKind::Wild(_) => TaskFamily::WildComplex,
        }
    }

    /// One-time setup after the Idle -> Starting transition.
    ///
    /// An error finishes the task as Failed with the given message.
    pub(crate) fn initialize(
        &mut self,
        state: &mut TaskState,
        ctx: &mut TaskContext<'_>,
    ) -> Result<(), String> {
        match self {
            TaskKind::OneShot(kind) => kind.initialize(state, ctx),
            TaskKind::Complex(kind) => kind.initialize(state, ctx),
            TaskKind::Wild(kind) => kind.initialize(state, ctx),
        }
    }

    /// First execution step, still inside the start call.
    pub(crate) fn execute(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> TickOutcome {
        match self {
            TaskKind::OneShot(kind) => kind.execute(state, ctx),
            TaskKind::Complex(kind) => kind.execute(state, ctx),
            TaskKind::Wild(kind) => kind.execute(state, ctx),
        }
    }

    /// Per-tick update while Running.
    pub(crate) fn update(
        &mut self,
        state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        match self {
            TaskKind::OneShot(kind) => kind.update(state, dt, ctx),
            TaskKind::Complex(kind) => kind.update(state, dt, ctx),
            TaskKind::Wild(kind) => kind.update(state, dt, ctx),
        }
    }

    /// Re-checked after every update; a false verdict fails the task.
    pub(crate) fn validate(&self, state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        match self {
            TaskKind::OneShot(kind) => kind.validate(state, ctx),
            TaskKind::Complex(kind) => kind.validate(state, ctx),
            TaskKind::Wild(kind) => kind.validate(state, ctx),
        }
    }

    /// Runs exactly once, on any exit from the active states.
    pub(crate) fn cleanup(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        match self {
            TaskKind::OneShot(kind) => kind.cleanup(state, ctx),
            TaskKind::Complex(kind) => kind.cleanup(state, ctx),
            TaskKind::Wild(kind) => kind.cleanup(state, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn class_names_round_trip_snake_case() {
        for class in TaskClass::ALL {
            let name = class.to_string();
            assert_eq!(TaskClass::from_str(&name).unwrap(), class);
        }
        assert_eq!(
            TaskClass::from_str("move_towards").unwrap(),
            TaskClass::MoveTowards
        );
        assert!(TaskClass::from_str("teleport").is_err());
    }

    #[test]
    fn families_partition_the_classes() {
        let one_shot = TaskClass::ALL
            .iter()
            .filter(|class| class.family() == TaskFamily::OneShot)
            .count();
        let complex = TaskClass::ALL
            .iter()
            .filter(|class| class.family() == TaskFamily::Complex)
            .count();
        let wild = TaskClass::ALL
            .iter()
            .filter(|class| class.family() == TaskFamily::WildComplex)
            .count();
        assert_eq!((one_shot, complex, wild), (7, 4, 2));
    }
}

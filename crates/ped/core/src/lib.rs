//! Deterministic task scheduling and state machines for animate entities.
//!
//! `ped-core` defines the canonical behavior rules: the [`task::Task`] state
//! machine, the three behavior families in [`kinds`], validated construction
//! through [`factory::TaskFactory`], and the per-ped [`manager::TaskManager`]
//! scheduler. Everything here is synchronous and side-effect free outside the
//! owning ped's state; world data is reached read-only through the oracle
//! traits in [`world`], and surrounding systems observe behavior purely
//! through the event channel in [`events`].
pub mod error;
pub mod events;
pub mod factory;
pub mod kinds;
pub mod manager;
pub mod math;
pub mod state;
pub mod task;
pub mod world;

pub use error::{ErrorSeverity, PedError};
pub use events::{EventSink, NullSink, RecordingSink, TaskEvent};
pub use factory::{BuildError, TaskFactory, TaskRegistry};
pub use kinds::{
    CycleState, TaskClass, TaskKind, TaskPhase,
    complex::{
        ClimbLadderParams, ClimbParams, ComplexTask, ComplexVariant, EnterVehicleParams,
        GrabLedgeParams,
    },
    oneshot::{
        AimParams, DropDownParams, JumpParams, LookAtParams, MoveTowardsParams, OneShotTask,
        OneShotVariant, ShimmyDirection, ShimmyParams, TurnParams,
    },
    wild::{
        CombatStrategy, CombatTargetsParams, FightMove, FightParams, FightingStyle, Score,
        WildTask, WildTuning, WildVariant,
    },
};
pub use manager::{ManagerConfig, TaskManager};
pub use math::{Rotator, Vec3};
pub use state::{PedId, PedState, Posture, ResourceMeter, TaskId};
pub use task::{
    DEFAULT_TIMEOUT, ResultBag, ResultValue, Task, TaskContext, TaskFamily, TaskPriority,
    TaskResult, TaskState, TaskStatus,
};
pub use world::{
    ActorOracle, ActorSnapshot, ActorsSnapshot, GeometryOracle, OpenGround, OracleError, PcgRng,
    RngOracle, WorldEnv, compute_seed,
};

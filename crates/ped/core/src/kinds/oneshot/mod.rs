//! One-shot behaviors.
//!
//! Actions that either finish in a single evaluation or ramp linearly over a
//! short explicit span: no internal phase machine, just a 0..=1 progress
//! ratio. A variant marked instant completes synchronously inside the start
//! call.

mod aim;
mod drop_down;
mod jump;
mod look_at;
mod move_towards;
mod shimmy;
mod turn;

pub use aim::{AimParams, AimTask};
pub use drop_down::{DropDownParams, DropDownTask};
pub use jump::{JumpParams, JumpTask};
pub use look_at::{LookAtParams, LookAtTask};
pub use move_towards::{MoveTowardsParams, MoveTowardsTask};
pub use shimmy::{ShimmyDirection, ShimmyParams, ShimmyTask};
pub use turn::{TurnParams, TurnTask};

use crate::kinds::TickOutcome;
use crate::task::{TaskContext, TaskState};

/// Hooks a one-shot behavior implements.
///
/// Mirrors the per-variant transition contract: optional preparation, an
/// instant application path, the per-tick ramp, and optional validation and
/// cleanup.
pub(crate) trait OneShotBehavior {
    /// One-time setup; an error fails the task before it runs.
    fn prepare(&mut self, _state: &mut TaskState, _ctx: &mut TaskContext<'_>) -> Result<(), String> {
        Ok(())
    }

    /// Apply the whole effect synchronously (instant completion path).
    fn apply_instantly(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> TickOutcome;

    /// Advance the action, updating `progress` toward 1.
    fn advance(
        &mut self,
        state: &mut TaskState,
        progress: &mut f32,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome;

    /// Mid-flight condition check; false fails the task.
    fn validate(&self, _state: &TaskState, _ctx: &TaskContext<'_>) -> bool {
        true
    }

    fn cleanup(&mut self, _state: &mut TaskState, _ctx: &mut TaskContext<'_>) {}
}

/// Concrete one-shot behaviors.
#[derive(Clone, Debug)]
pub enum OneShotVariant {
    Aim(AimTask),
    LookAt(LookAtTask),
    Turn(TurnTask),
    Shimmy(ShimmyTask),
    DropDown(DropDownTask),
    Jump(JumpTask),
    MoveTowards(MoveTowardsTask),
}

impl OneShotVariant {
    fn behavior_mut(&mut self) -> &mut dyn OneShotBehavior {
        match self {
            Self::Aim(task) => task,
            Self::LookAt(task) => task,
            Self::Turn(task) => task,
            Self::Shimmy(task) => task,
            Self::DropDown(task) => task,
            Self::Jump(task) => task,
            Self::MoveTowards(task) => task,
        }
    }

    fn behavior(&self) -> &dyn OneShotBehavior {
        match self {
            Self::Aim(task) => task,
            Self::LookAt(task) => task,
            Self::Turn(task) => task,
            Self::Shimmy(task) => task,
            Self::DropDown(task) => task,
            Self::Jump(task) => task,
            Self::MoveTowards(task) => task,
        }
    }
}

/// Family scaffold: owns the progress ramp and the instant-complete switch.
#[derive(Clone, Debug)]
pub struct OneShotTask {
    variant: OneShotVariant,
    instant: bool,
    progress: f32,
}

impl OneShotTask {
    pub fn new(variant: OneShotVariant) -> Self {
        Self {
            variant,
            instant: false,
            progress: 0.0,
        }
    }

    /// Complete synchronously inside the start call.
    pub fn instant(mut self) -> Self {
        self.instant = true;
        self
    }

    /// Progress ratio in [0, 1].
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn variant(&self) -> &OneShotVariant {
        &self.variant
    }

    pub(crate) fn initialize(
        &mut self,
        state: &mut TaskState,
        ctx: &mut TaskContext<'_>,
    ) -> Result<(), String> {
        self.variant.behavior_mut().prepare(state, ctx)
    }

    pub(crate) fn execute(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> TickOutcome {
        if self.instant {
            self.progress = 1.0;
            self.variant.behavior_mut().apply_instantly(state, ctx)
        } else {
            TickOutcome::Continue
        }
    }

    pub(crate) fn update(
        &mut self,
        state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        let outcome = self
            .variant
            .behavior_mut()
            .advance(state, &mut self.progress, dt, ctx);
        self.progress = self.progress.clamp(0.0, 1.0);
        outcome
    }

    pub(crate) fn validate(&self, state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        self.variant.behavior().validate(state, ctx)
    }

    pub(crate) fn cleanup(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        self.variant.behavior_mut().cleanup(state, ctx);
    }
}

/// Resolve the current world position of the bound target.
pub(crate) fn target_position(
    state: &TaskState,
    ctx: &TaskContext<'_>,
) -> Result<crate::math::Vec3, String> {
    let target = state.target.ok_or_else(|| "no target bound".to_owned())?;
    let snapshot = ctx.world.actor(target).map_err(|err| err.to_string())?;
    Ok(snapshot.position)
}

/// True when the bound target can still be observed and is alive.
pub(crate) fn target_alive(state: &TaskState, ctx: &TaskContext<'_>) -> bool {
    match state.target {
        Some(target) => ctx
            .world
            .actor(target)
            .map(|snapshot| snapshot.alive)
            .unwrap_or(false),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use crate::kinds::{TaskClass, TaskKind};
    use crate::math::{Rotator, Vec3};
    use crate::state::{PedId, PedState, TaskId};
    use crate::task::{Task, TaskContext, TaskStatus};
    use crate::world::WorldEnv;

    #[test]
    fn instant_one_shot_completes_inside_start() {
        let params = TurnParams {
            rotation: Some(Rotator::new(0.0, 90.0, 0.0)),
            ..TurnParams::default()
        };
        let mut task = Task::new(
            TaskId(1),
            TaskClass::Turn,
            PedId(1),
            None,
            TaskKind::OneShot(
                OneShotTask::new(OneShotVariant::Turn(TurnTask::new(params))).instant(),
            ),
        );
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut sink = RecordingSink::new();
        let mut ctx = TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);

        assert!(task.start(&mut ctx));
        assert_eq!(task.status(), TaskStatus::Completed);
        assert_eq!(sink.completions(), 1);
        assert!((ped.rotation.yaw - 90.0).abs() < 1e-4);
        let result = task.result().unwrap();
        assert!(result.success);
        assert!(result.outputs.contains_key("turn_arc_degrees"));
    }
}

//! Turn the head and torso toward a point of interest.

use super::{OneShotBehavior, target_position};
use crate::kinds::TickOutcome;
use crate::math::{Rotator, Vec3, wrap_degrees};
use crate::task::{TaskContext, TaskState};

#[derive(Clone, Copy, Debug)]
pub struct LookAtParams {
    /// Seconds over which the facing interpolates.
    pub duration: f32,
    /// Constrain to yaw only (no pitch toward the point).
    pub horizontal_only: bool,
    /// Explicit look direction instead of a target.
    pub direction: Option<Vec3>,
}

impl Default for LookAtParams {
    fn default() -> Self {
        Self {
            duration: 0.8,
            horizontal_only: false,
            direction: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LookAtTask {
    params: LookAtParams,
    start: Option<Rotator>,
}

impl LookAtTask {
    pub fn new(params: LookAtParams) -> Self {
        Self {
            params,
            start: None,
        }
    }
}

/// Interpolate from `start` toward `goal` by fraction `t`, per axis along
/// the shortest arc.
fn blend(start: Rotator, goal: Rotator, t: f32) -> Rotator {
    let t = t.clamp(0.0, 1.0);
    Rotator::new(
        start.pitch + wrap_degrees(goal.pitch - start.pitch) * t,
        start.yaw + wrap_degrees(goal.yaw - start.yaw) * t,
        start.roll + wrap_degrees(goal.roll - start.roll) * t,
    )
}

impl OneShotBehavior for LookAtTask {
    fn prepare(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> Result<(), String> {
        if self.params.direction.is_none() && state.target.is_none() {
            return Err("look-at requires a target or an explicit direction".to_owned());
        }
        self.start = Some(ctx.ped.rotation);
        Ok(())
    }

    fn apply_instantly(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> TickOutcome {
        let look_direction = match self.params.direction {
            Some(direction) => direction,
            None => match target_position(state, ctx) {
                Ok(position) => position - ctx.ped.position,
                Err(message) => return TickOutcome::fail(message),
            },
        };
        let mut goal = Rotator::facing(look_direction);
        if self.params.horizontal_only {
            goal = goal.horizontal();
        }
        ctx.ped.rotation = goal;
        TickOutcome::done("look-at complete")
    }

    fn advance(
        &mut self,
        state: &mut TaskState,
        progress: &mut f32,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        let look_direction = match self.params.direction {
            Some(direction) => direction,
            None => match target_position(state, ctx) {
                Ok(position) => position - ctx.ped.position,
                Err(message) => return TickOutcome::fail(message),
            },
        };
        let mut goal = Rotator::facing(look_direction);
        if self.params.horizontal_only {
            goal = goal.horizontal();
        }

        *progress += dt / self.params.duration.max(f32::EPSILON);
        let start = *self.start.get_or_insert(ctx.ped.rotation);
        ctx.ped.rotation = blend(start, goal, *progress);

        if *progress >= 1.0 {
            TickOutcome::done("look-at complete")
        } else {
            TickOutcome::Continue
        }
    }

    fn validate(&self, state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        // Looking at something only needs the target to still exist.
        self.params.direction.is_some()
            || state
                .target
                .map(|target| ctx.world.actor(target).is_ok())
                .unwrap_or(false)
    }
}

//! Aim at a target or direction.

use super::{OneShotBehavior, target_alive};
use crate::kinds::TickOutcome;
use crate::math::{Rotator, Vec3};
use crate::state::PedState;
use crate::task::{TaskContext, TaskState};
use crate::world::WorldEnv;

/// Assumed projectile speed for predictive target leading (m/s).
const PROJECTILE_SPEED: f32 = 40.0;

#[derive(Clone, Copy, Debug)]
pub struct AimParams {
    /// Rotation speed in degrees per second.
    pub speed: f32,
    /// Lead a moving target by its velocity.
    pub predictive: bool,
    /// Explicit aim direction; waives the target requirement.
    pub direction: Option<Vec3>,
    /// Alignment tolerance in degrees.
    pub tolerance: f32,
}

impl Default for AimParams {
    fn default() -> Self {
        Self {
            speed: 120.0,
            predictive: false,
            direction: None,
            tolerance: 2.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AimTask {
    params: AimParams,
    initial_arc: Option<f32>,
}

impl AimTask {
    pub fn new(params: AimParams) -> Self {
        Self {
            params,
            initial_arc: None,
        }
    }

    fn goal_rotation(
        &self,
        state: &TaskState,
        ped: &PedState,
        world: &WorldEnv<'_>,
    ) -> Result<Rotator, String> {
        if let Some(direction) = self.params.direction {
            return Ok(Rotator::facing(direction));
        }
        let target = state.target.ok_or_else(|| "no aim target bound".to_owned())?;
        let snapshot = world.actor(target).map_err(|err| err.to_string())?;
        let mut aim_point = snapshot.position;
        if self.params.predictive {
            let flight_time = ped.position.distance(snapshot.position) / PROJECTILE_SPEED;
            aim_point += snapshot.velocity * flight_time;
        }
        Ok(Rotator::facing(aim_point - ped.position))
    }
}

impl OneShotBehavior for AimTask {
    fn prepare(&mut self, state: &mut TaskState, _ctx: &mut TaskContext<'_>) -> Result<(), String> {
        if self.params.direction.is_none() && state.target.is_none() {
            return Err("aim requires a target or an explicit direction".to_owned());
        }
        Ok(())
    }

    fn apply_instantly(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> TickOutcome {
        match self.goal_rotation(state, ctx.ped, &ctx.world) {
            Ok(goal) => {
                ctx.ped.rotation = goal;
                TickOutcome::done("aim locked")
            }
            Err(message) => TickOutcome::fail(message),
        }
    }

    fn advance(
        &mut self,
        state: &mut TaskState,
        progress: &mut f32,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        let goal = match self.goal_rotation(state, ctx.ped, &ctx.world) {
            Ok(goal) => goal,
            Err(message) => return TickOutcome::fail(message),
        };

        let remaining = ctx.ped.rotation.angle_to(goal);
        let initial = *self.initial_arc.get_or_insert(remaining.max(f32::EPSILON));
        if remaining <= self.params.tolerance {
            *progress = 1.0;
            return TickOutcome::done("aim locked");
        }

        let (rotation, _) = ctx
            .ped
            .rotation
            .rotate_towards(goal, self.params.speed * dt);
        ctx.ped.rotation = rotation;
        *progress = 1.0 - remaining / initial;
        TickOutcome::Continue
    }

    fn validate(&self, state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        // An explicit direction cannot go stale; a target can.
        self.params.direction.is_some() || target_alive(state, ctx)
    }
}

//! Turn the body toward a rotation or direction.

use super::{OneShotBehavior, target_alive, target_position};
use crate::kinds::TickOutcome;
use crate::math::{Rotator, Vec3};
use crate::task::{TaskContext, TaskState};

#[derive(Clone, Copy, Debug)]
pub struct TurnParams {
    /// Explicit goal rotation; wins over `direction` and the target.
    pub rotation: Option<Rotator>,
    /// Goal direction to face.
    pub direction: Option<Vec3>,
    /// Turn speed in degrees per second.
    pub speed: f32,
    /// Completion tolerance in degrees.
    pub tolerance: f32,
}

impl Default for TurnParams {
    fn default() -> Self {
        Self {
            rotation: None,
            direction: None,
            speed: 90.0,
            tolerance: 1.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TurnTask {
    params: TurnParams,
    /// Total arc traversed so far, kept as a diagnostic output.
    arc_traversed: f32,
    initial_arc: Option<f32>,
}

impl TurnTask {
    pub fn new(params: TurnParams) -> Self {
        Self {
            params,
            arc_traversed: 0.0,
            initial_arc: None,
        }
    }

    fn goal(&self, state: &TaskState, ctx: &TaskContext<'_>) -> Result<Rotator, String> {
        if let Some(rotation) = self.params.rotation {
            return Ok(rotation);
        }
        if let Some(direction) = self.params.direction {
            return Ok(Rotator::facing(direction).horizontal());
        }
        let position = target_position(state, ctx)?;
        Ok(Rotator::facing(position - ctx.ped.position).horizontal())
    }
}

impl OneShotBehavior for TurnTask {
    fn prepare(&mut self, state: &mut TaskState, _ctx: &mut TaskContext<'_>) -> Result<(), String> {
        if self.params.rotation.is_none()
            && self.params.direction.is_none()
            && state.target.is_none()
        {
            return Err("turn has no goal rotation, direction, or target".to_owned());
        }
        Ok(())
    }

    fn apply_instantly(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> TickOutcome {
        match self.goal(state, ctx) {
            Ok(goal) => {
                self.arc_traversed = ctx.ped.rotation.angle_to(goal);
                ctx.ped.rotation = goal;
                state
                    .outputs
                    .insert("turn_arc_degrees".to_owned(), self.arc_traversed.into());
                TickOutcome::done("turn complete")
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
        let goal = match self.goal(state, ctx) {
            Ok(goal) => goal,
            Err(message) => return TickOutcome::fail(message),
        };

        let remaining = ctx.ped.rotation.angle_to(goal);
        let initial = *self.initial_arc.get_or_insert(remaining.max(f32::EPSILON));
        if remaining <= self.params.tolerance {
            *progress = 1.0;
            state
                .outputs
                .insert("turn_arc_degrees".to_owned(), self.arc_traversed.into());
            return TickOutcome::done("turn complete");
        }

        let (rotation, arc) = ctx
            .ped
            .rotation
            .rotate_towards(goal, self.params.speed * dt);
        ctx.ped.rotation = rotation;
        self.arc_traversed += arc;
        state
            .outputs
            .insert("turn_arc_degrees".to_owned(), self.arc_traversed.into());
        *progress = 1.0 - remaining / initial;
        TickOutcome::Continue
    }

    fn validate(&self, state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        // Only a target-driven turn can lose its goal mid-flight.
        self.params.rotation.is_some()
            || self.params.direction.is_some()
            || target_alive(state, ctx)
    }
}

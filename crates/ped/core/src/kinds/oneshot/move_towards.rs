//! Straight-line approach to a location or actor.

use super::{OneShotBehavior, target_alive, target_position};
use crate::kinds::TickOutcome;
use crate::math::Vec3;
use crate::task::{TaskContext, TaskState};

#[derive(Clone, Copy, Debug)]
pub struct MoveTowardsParams {
    /// Fixed destination; when `None`, the bound target actor is followed.
    pub destination: Option<Vec3>,
    /// Movement speed in meters per second.
    pub speed: f32,
    /// Completion radius around the goal, in meters.
    pub stop_distance: f32,
}

impl Default for MoveTowardsParams {
    fn default() -> Self {
        Self {
            destination: None,
            speed: 3.0,
            stop_distance: 0.5,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MoveTowardsTask {
    params: MoveTowardsParams,
    initial_distance: Option<f32>,
}

impl MoveTowardsTask {
    pub fn new(params: MoveTowardsParams) -> Self {
        Self {
            params,
            initial_distance: None,
        }
    }

    fn goal(&self, state: &TaskState, ctx: &TaskContext<'_>) -> Result<Vec3, String> {
        match self.params.destination {
            Some(destination) => Ok(destination),
            None => target_position(state, ctx),
        }
    }
}

impl OneShotBehavior for MoveTowardsTask {
    fn prepare(&mut self, state: &mut TaskState, _ctx: &mut TaskContext<'_>) -> Result<(), String> {
        if self.params.destination.is_none() && state.target.is_none() {
            return Err("move-towards has no destination or target".to_owned());
        }
        Ok(())
    }

    fn apply_instantly(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> TickOutcome {
        match self.goal(state, ctx) {
            Ok(goal) => {
                ctx.ped.position = goal;
                ctx.ped.velocity = Vec3::ZERO;
                TickOutcome::done("destination reached")
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

        let mut distance = ctx.ped.position.distance(goal);
        let initial = *self.initial_distance.get_or_insert(distance.max(f32::EPSILON));

        if distance > self.params.stop_distance {
            let direction = (goal - ctx.ped.position).normalized();
            ctx.ped.position = ctx
                .ped
                .position
                .move_towards(goal, self.params.speed * dt);
            ctx.ped.velocity = direction * self.params.speed;
            if direction != Vec3::ZERO {
                ctx.ped.rotation.yaw = direction.yaw_degrees();
            }
            distance = ctx.ped.position.distance(goal);
        }

        *progress = (1.0 - distance / initial).clamp(0.0, 1.0);

        if distance <= self.params.stop_distance {
            ctx.ped.velocity = Vec3::ZERO;
            TickOutcome::done("destination reached")
        } else {
            TickOutcome::Continue
        }
    }

    fn validate(&self, state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        self.params.destination.is_some() || target_alive(state, ctx)
    }

    fn cleanup(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        ctx.ped.velocity = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::state::{PedId, PedState};
    use crate::world::WorldEnv;

    #[test]
    fn approach_completes_within_stop_distance() {
        let mut task = MoveTowardsTask::new(MoveTowardsParams {
            destination: Some(Vec3::new(10.0, 0.0, 0.0)),
            speed: 4.0,
            stop_distance: 1.0,
        });
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        let mut sink = NullSink;
        let mut state_stub =
            crate::task::test_state(crate::kinds::TaskClass::MoveTowards, PedId(1), None);

        let mut progress = 0.0;
        let mut ticks = 0;
        loop {
            let mut ctx = crate::task::TaskContext::new(&mut ped, WorldEnv::empty(), &mut sink);
            let out = task.advance(&mut state_stub, &mut progress, 1.0, &mut ctx);
            ticks += 1;
            if let TickOutcome::Complete { success, .. } = out {
                assert!(success);
                break;
            }
            assert!(ticks < 10, "approach did not converge");
        }
        assert!(ped.position.distance(Vec3::new(10.0, 0.0, 0.0)) <= 1.0 + 1e-4);
        assert_eq!(ped.velocity, Vec3::ZERO);
    }
}

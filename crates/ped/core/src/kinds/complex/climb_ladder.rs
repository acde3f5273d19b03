//! Traverse a ladder.

use super::{ComplexBehavior, TaskPhase};
use crate::kinds::TickOutcome;
use crate::math::Vec3;
use crate::state::Posture;
use crate::task::{TaskContext, TaskState};

const ANCHOR_EPSILON: f32 = 0.05;
/// Walk speed while approaching the ladder.
const APPROACH_SPEED: f32 = 2.0;

#[derive(Clone, Copy, Debug)]
pub struct ClimbLadderParams {
    /// Climb toward the top anchor; false descends to the bottom.
    pub climb_up: bool,
    /// Rung traversal speed in meters per second.
    pub climb_speed: f32,
    /// Ladder length from bottom to top anchor, in meters.
    pub ladder_height: f32,
    /// Explicit ladder base; the bound target's position when `None`.
    pub base: Option<Vec3>,
}

impl Default for ClimbLadderParams {
    fn default() -> Self {
        Self {
            climb_up: true,
            climb_speed: 1.0,
            ladder_height: 3.0,
            base: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClimbLadderTask {
    params: ClimbLadderParams,
    bottom: Option<Vec3>,
    top: Option<Vec3>,
    step_off: Option<Vec3>,
}

impl ClimbLadderTask {
    pub fn new(params: ClimbLadderParams) -> Self {
        Self {
            params,
            bottom: None,
            top: None,
            step_off: None,
        }
    }

    fn start_anchor(&self) -> Option<Vec3> {
        if self.params.climb_up {
            self.bottom
        } else {
            self.top
        }
    }

    fn end_anchor(&self) -> Option<Vec3> {
        if self.params.climb_up {
            self.top
        } else {
            self.bottom
        }
    }
}

impl ComplexBehavior for ClimbLadderTask {
    fn prepare(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> Result<(), String> {
        let base = match self.params.base {
            Some(base) => base,
            None => match state.target {
                Some(target) => {
                    let snapshot = ctx.world.actor(target).map_err(|err| err.to_string())?;
                    snapshot.position
                }
                None => return Err("no ladder located".to_owned()),
            },
        };
        if self.params.ladder_height <= 0.0 {
            return Err("ladder has no length".to_owned());
        }
        self.bottom = Some(base);
        self.top = Some(base + Vec3::UP * self.params.ladder_height);
        Ok(())
    }

    fn execute_phase(
        &mut self,
        phase: TaskPhase,
        _state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        let (Some(start), Some(end)) = (self.start_anchor(), self.end_anchor()) else {
            return TickOutcome::fail("ladder was not prepared");
        };

        match phase {
            TaskPhase::Preparation => {
                ctx.ped.position = ctx.ped.position.move_towards(start, APPROACH_SPEED * dt);
            }
            TaskPhase::Execution => {
                ctx.ped.posture = Posture::Climbing;
                ctx.ped.position = ctx
                    .ped
                    .position
                    .move_towards(end, self.params.climb_speed * dt);
            }
            TaskPhase::Completion => {
                let step_off = *self.step_off.get_or_insert_with(|| {
                    let facing = ctx.ped.facing();
                    end + Vec3::new(facing.x, facing.y, 0.0).normalized() * 0.4
                });
                ctx.ped.position = ctx.ped.position.move_towards(step_off, APPROACH_SPEED * dt);
            }
            TaskPhase::Cleanup => {
                ctx.ped.posture = Posture::Standing;
                ctx.ped.velocity = Vec3::ZERO;
            }
        }
        TickOutcome::Continue
    }

    fn can_advance(&self, phase: TaskPhase, _state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        let (Some(start), Some(end)) = (self.start_anchor(), self.end_anchor()) else {
            return false;
        };
        match phase {
            TaskPhase::Preparation => ctx.ped.position.distance(start) <= ANCHOR_EPSILON,
            TaskPhase::Execution => ctx.ped.position.distance(end) <= ANCHOR_EPSILON,
            TaskPhase::Completion => self
                .step_off
                .map(|step_off| ctx.ped.position.distance(step_off) <= ANCHOR_EPSILON)
                .unwrap_or(false),
            TaskPhase::Cleanup => true,
        }
    }

    fn cleanup(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        if ctx.ped.posture == Posture::Climbing {
            ctx.ped.posture = Posture::Standing;
        }
        ctx.ped.velocity = Vec3::ZERO;
    }

    fn finished_message(&self) -> &'static str {
        "ladder climb complete"
    }
}

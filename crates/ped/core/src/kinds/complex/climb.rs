//! Climb over an obstacle.

use super::{ComplexBehavior, TaskPhase};
use crate::kinds::TickOutcome;
use crate::math::Vec3;
use crate::state::Posture;
use crate::task::{TaskContext, TaskState};

/// How close an anchor must be before its phase can advance.
const ANCHOR_EPSILON: f32 = 0.05;

#[derive(Clone, Copy, Debug)]
pub struct ClimbParams {
    /// Vertical traversal speed in meters per second.
    pub climb_speed: f32,
    /// Probe the obstacle height through the geometry oracle.
    pub auto_detect_height: bool,
    /// Explicit obstacle height; required when auto-detection is off.
    pub climb_height: Option<f32>,
    /// Tallest obstacle this task will attempt.
    pub max_height: f32,
}

impl Default for ClimbParams {
    fn default() -> Self {
        Self {
            climb_speed: 1.2,
            auto_detect_height: true,
            climb_height: None,
            max_height: 3.0,
        }
    }
}

/// Anchor points computed during preparation.
#[derive(Clone, Copy, Debug)]
struct ClimbAnchors {
    start: Vec3,
    top: Vec3,
    end: Vec3,
}

#[derive(Clone, Debug)]
pub struct ClimbTask {
    params: ClimbParams,
    anchors: Option<ClimbAnchors>,
}

impl ClimbTask {
    pub fn new(params: ClimbParams) -> Self {
        Self {
            params,
            anchors: None,
        }
    }
}

impl ComplexBehavior for ClimbTask {
    fn prepare(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> Result<(), String> {
        // The obstacle face is the target if one is bound, otherwise a probe
        // one meter ahead of the ped's facing.
        let base = match state.target {
            Some(target) => {
                let snapshot = ctx.world.actor(target).map_err(|err| err.to_string())?;
                snapshot.position
            }
            None => ctx.ped.position + ctx.ped.facing().normalized() * 1.0,
        };

        let height = if let Some(height) = self.params.climb_height {
            height
        } else if self.params.auto_detect_height {
            let geometry = ctx.world.geometry().map_err(|err| err.to_string())?;
            let surface = geometry
                .surface_height(base)
                .ok_or_else(|| "no climbable surface within reach".to_owned())?;
            surface - ctx.ped.position.z
        } else {
            return Err("climb height unknown and auto-detection disabled".to_owned());
        };

        if height <= 0.2 {
            return Err("nothing to climb".to_owned());
        }
        if height > self.params.max_height {
            return Err("obstacle too tall to climb".to_owned());
        }

        let wall = Vec3::new(base.x, base.y, ctx.ped.position.z);
        let over = (wall - ctx.ped.position).normalized() * 0.5;
        self.anchors = Some(ClimbAnchors {
            start: wall,
            top: wall + Vec3::UP * height,
            end: wall + Vec3::UP * height + over,
        });
        Ok(())
    }

    fn execute_phase(
        &mut self,
        phase: TaskPhase,
        _state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        let anchors = match self.anchors {
            Some(anchors) => anchors,
            None => return TickOutcome::fail("climb was not prepared"),
        };
        let step = self.params.climb_speed * dt;

        match phase {
            TaskPhase::Preparation => {
                ctx.ped.position = ctx.ped.position.move_towards(anchors.start, step);
            }
            TaskPhase::Execution => {
                ctx.ped.posture = Posture::Climbing;
                ctx.ped.position = ctx.ped.position.move_towards(anchors.top, step);
            }
            TaskPhase::Completion => {
                ctx.ped.position = ctx.ped.position.move_towards(anchors.end, step);
            }
            TaskPhase::Cleanup => {
                ctx.ped.posture = Posture::Standing;
                ctx.ped.velocity = Vec3::ZERO;
            }
        }
        TickOutcome::Continue
    }

    fn can_advance(&self, phase: TaskPhase, _state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        let Some(anchors) = self.anchors else {
            return false;
        };
        match phase {
            TaskPhase::Preparation => ctx.ped.position.distance(anchors.start) <= ANCHOR_EPSILON,
            TaskPhase::Execution => ctx.ped.position.distance(anchors.top) <= ANCHOR_EPSILON,
            TaskPhase::Completion => ctx.ped.position.distance(anchors.end) <= ANCHOR_EPSILON,
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
        "climb complete"
    }
}

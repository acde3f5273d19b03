//! Grab a ledge and hold on.

use super::{ComplexBehavior, TaskPhase};
use crate::kinds::TickOutcome;
use crate::math::Vec3;
use crate::state::Posture;
use crate::task::{TaskContext, TaskState};

/// Reach speed toward the hang point, in meters per second.
const REACH_SPEED: f32 = 1.5;
/// Hands-to-feet offset while hanging.
const HANG_DROP: f32 = 0.9;
const ANCHOR_EPSILON: f32 = 0.05;

#[derive(Clone, Copy, Debug)]
pub struct GrabLedgeParams {
    /// Explicit ledge point; auto-detected through geometry when `None`.
    pub ledge: Option<Vec3>,
    /// Maximum reach to a valid ledge, in meters.
    pub grab_range: f32,
    /// How long to hold once hanging, in seconds.
    pub hold_duration: f32,
    /// Stamina drained per second while hanging.
    pub stamina_drain_rate: f32,
}

impl Default for GrabLedgeParams {
    fn default() -> Self {
        Self {
            ledge: None,
            grab_range: 1.5,
            hold_duration: 5.0,
            stamina_drain_rate: 10.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GrabLedgeTask {
    params: GrabLedgeParams,
    ledge: Option<Vec3>,
    held: f32,
}

impl GrabLedgeTask {
    pub fn new(params: GrabLedgeParams) -> Self {
        Self {
            params,
            ledge: None,
            held: 0.0,
        }
    }

    fn hang_point(&self) -> Option<Vec3> {
        self.ledge.map(|ledge| ledge - Vec3::UP * HANG_DROP)
    }
}

impl ComplexBehavior for GrabLedgeTask {
    fn prepare(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) -> Result<(), String> {
        let ledge = match self.params.ledge {
            Some(ledge) => {
                if ctx.ped.position.distance(ledge) > self.params.grab_range {
                    return Err("ledge out of reach".to_owned());
                }
                ledge
            }
            None => {
                let geometry = ctx.world.geometry().map_err(|err| err.to_string())?;
                geometry
                    .nearest_ledge(ctx.ped.position, self.params.grab_range)
                    .ok_or_else(|| "no ledge within reach".to_owned())?
            }
        };
        self.ledge = Some(ledge);
        Ok(())
    }

    fn execute_phase(
        &mut self,
        phase: TaskPhase,
        state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        let Some(ledge) = self.ledge else {
            return TickOutcome::fail("grab-ledge was not prepared");
        };
        let hang = ledge - Vec3::UP * HANG_DROP;

        match phase {
            TaskPhase::Preparation => {
                ctx.ped.position = ctx.ped.position.move_towards(hang, REACH_SPEED * dt);
            }
            TaskPhase::Execution => {
                ctx.ped.posture = Posture::Hanging;
                ctx.ped.stamina.drain(self.params.stamina_drain_rate * dt);
                self.held += dt;
                state
                    .outputs
                    .insert("hold_time".to_owned(), self.held.into());
                if ctx.ped.stamina.is_depleted() {
                    return TickOutcome::fail("stamina exhausted");
                }
            }
            TaskPhase::Completion => {
                // Mantle up over the lip.
                ctx.ped.position = ctx
                    .ped
                    .position
                    .move_towards(ledge + Vec3::UP * 0.2, REACH_SPEED * dt);
            }
            TaskPhase::Cleanup => {
                ctx.ped.posture = Posture::Standing;
                ctx.ped.velocity = Vec3::ZERO;
            }
        }
        TickOutcome::Continue
    }

    fn can_advance(&self, phase: TaskPhase, _state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        let Some(hang) = self.hang_point() else {
            return false;
        };
        match phase {
            TaskPhase::Preparation => ctx.ped.position.distance(hang) <= ANCHOR_EPSILON,
            TaskPhase::Execution => self.held >= self.params.hold_duration,
            TaskPhase::Completion => {
                let mantle = hang + Vec3::UP * (HANG_DROP + 0.2);
                ctx.ped.position.distance(mantle) <= ANCHOR_EPSILON
            }
            TaskPhase::Cleanup => true,
        }
    }

    fn cleanup(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        // A cancelled or failed hold leaves the ped hanging; a follow-up task
        // (drop-down) decides what happens next.
        ctx.ped.velocity = Vec3::ZERO;
    }

    fn finished_message(&self) -> &'static str {
        "ledge hold complete"
    }
}

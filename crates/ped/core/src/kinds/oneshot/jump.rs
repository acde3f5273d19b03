//! Ballistic jump toward a landing point.

use super::OneShotBehavior;
use crate::kinds::TickOutcome;
use crate::math::Vec3;
use crate::state::Posture;
use crate::task::{TaskContext, TaskState};

/// Shortest flight time, so very close jumps still arc.
const MIN_FLIGHT_TIME: f32 = 0.35;

#[derive(Clone, Copy, Debug)]
pub struct JumpParams {
    /// Landing point the jump arcs toward.
    pub target: Vec3,
    /// Apex height above the straight start-to-target line, in meters.
    pub height: f32,
    /// Horizontal launch speed in meters per second.
    pub force: f32,
    /// Require a safe-landing query hit at the target before committing.
    pub check_landing: bool,
}

impl Default for JumpParams {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            height: 1.2,
            force: 5.0,
            check_landing: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct JumpTask {
    params: JumpParams,
    start: Option<Vec3>,
    flight_time: f32,
    airborne: f32,
}

impl JumpTask {
    pub fn new(params: JumpParams) -> Self {
        Self {
            params,
            start: None,
            flight_time: MIN_FLIGHT_TIME,
            airborne: 0.0,
        }
    }
}

impl OneShotBehavior for JumpTask {
    fn prepare(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) -> Result<(), String> {
        if self.params.check_landing {
            let geometry = ctx.world.geometry().map_err(|err| err.to_string())?;
            geometry
                .safe_landing(
                    self.params.target + Vec3::UP * self.params.height,
                    self.params.height * 2.0,
                )
                .ok_or_else(|| "no safe landing at jump target".to_owned())?;
        }

        let distance = ctx.ped.position.horizontal_distance(self.params.target);
        self.flight_time = (distance / self.params.force.max(f32::EPSILON)).max(MIN_FLIGHT_TIME);
        self.start = Some(ctx.ped.position);
        ctx.ped.posture = Posture::Airborne;
        Ok(())
    }

    fn apply_instantly(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) -> TickOutcome {
        ctx.ped.position = self.params.target;
        ctx.ped.posture = Posture::Standing;
        ctx.ped.velocity = Vec3::ZERO;
        TickOutcome::done("jump complete")
    }

    fn advance(
        &mut self,
        _state: &mut TaskState,
        progress: &mut f32,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        let start = match self.start {
            Some(start) => start,
            None => return TickOutcome::fail("jump was not prepared"),
        };

        self.airborne += dt;
        let t = (self.airborne / self.flight_time).min(1.0);
        let previous = ctx.ped.position;
        let mut position = start.lerp(self.params.target, t);
        // Parabolic arc peaking at the configured height mid-flight.
        position.z += 4.0 * self.params.height * t * (1.0 - t);
        ctx.ped.position = position;
        ctx.ped.velocity = (position - previous) * (1.0 / dt.max(f32::EPSILON));
        *progress = t;

        if t >= 1.0 {
            ctx.ped.posture = Posture::Standing;
            ctx.ped.velocity = Vec3::ZERO;
            TickOutcome::done("jump complete")
        } else {
            TickOutcome::Continue
        }
    }

    fn cleanup(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        if ctx.ped.posture == Posture::Airborne {
            ctx.ped.posture = Posture::Standing;
            ctx.ped.velocity = Vec3::ZERO;
        }
    }
}

//! Drop from a ledge hold.

use super::OneShotBehavior;
use crate::kinds::TickOutcome;
use crate::math::Vec3;
use crate::state::Posture;
use crate::task::{TaskContext, TaskState};

/// Controlled descent speed in meters per second.
const DROP_SPEED: f32 = 5.0;

#[derive(Clone, Copy, Debug)]
pub struct DropDownParams {
    /// Maximum height to descend, in meters.
    pub drop_height: f32,
    /// Require a safe-landing query hit before committing.
    pub check_landing: bool,
}

impl Default for DropDownParams {
    fn default() -> Self {
        Self {
            drop_height: 2.0,
            check_landing: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DropDownTask {
    params: DropDownParams,
    landing: Option<Vec3>,
}

impl DropDownTask {
    pub fn new(params: DropDownParams) -> Self {
        Self {
            params,
            landing: None,
        }
    }
}

impl OneShotBehavior for DropDownTask {
    fn prepare(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) -> Result<(), String> {
        if ctx.ped.posture != Posture::Hanging {
            return Err("drop-down requires a ledge hold".to_owned());
        }

        let landing = if self.params.check_landing {
            let geometry = ctx.world.geometry().map_err(|err| err.to_string())?;
            geometry
                .safe_landing(ctx.ped.position, self.params.drop_height)
                .ok_or_else(|| "no safe landing below".to_owned())?
        } else {
            ctx.ped.position - Vec3::UP * self.params.drop_height
        };
        self.landing = Some(landing);
        ctx.ped.posture = Posture::Airborne;
        Ok(())
    }

    fn apply_instantly(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) -> TickOutcome {
        let landing = match self.landing {
            Some(landing) => landing,
            None => return TickOutcome::fail("drop-down has no landing point"),
        };
        ctx.ped.position = landing;
        ctx.ped.posture = Posture::Standing;
        ctx.ped.velocity = Vec3::ZERO;
        TickOutcome::done("drop complete")
    }

    fn advance(
        &mut self,
        _state: &mut TaskState,
        progress: &mut f32,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        let landing = match self.landing {
            Some(landing) => landing,
            None => return TickOutcome::fail("drop-down has no landing point"),
        };

        ctx.ped.position = ctx.ped.position.move_towards(landing, DROP_SPEED * dt);
        let remaining = ctx.ped.position.distance(landing);
        *progress = 1.0 - (remaining / self.params.drop_height.max(f32::EPSILON)).min(1.0);

        if remaining <= f32::EPSILON {
            ctx.ped.posture = Posture::Standing;
            ctx.ped.velocity = Vec3::ZERO;
            TickOutcome::done("drop complete")
        } else {
            TickOutcome::Continue
        }
    }

    fn cleanup(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        // Never leave the ped mid-air when cancelled.
        if ctx.ped.posture == Posture::Airborne {
            ctx.ped.posture = Posture::Standing;
            ctx.ped.velocity = Vec3::ZERO;
        }
    }
}

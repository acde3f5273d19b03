//! Side-step along a ledge.

use super::OneShotBehavior;
use crate::kinds::TickOutcome;
use crate::math::Vec3;
use crate::state::PedState;
use crate::task::{TaskContext, TaskState};

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ShimmyDirection {
    #[default]
    Left,
    Right,
}

#[derive(Clone, Copy, Debug)]
pub struct ShimmyParams {
    pub direction: ShimmyDirection,
    /// Total lateral distance to cover, in meters.
    pub distance: f32,
    /// Lateral speed in meters per second.
    pub speed: f32,
    /// Probe the path before and while moving.
    pub check_obstacles: bool,
}

impl Default for ShimmyParams {
    fn default() -> Self {
        Self {
            direction: ShimmyDirection::Left,
            distance: 1.0,
            speed: 0.75,
            check_obstacles: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ShimmyTask {
    params: ShimmyParams,
    moved: f32,
}

impl ShimmyTask {
    pub fn new(params: ShimmyParams) -> Self {
        Self { params, moved: 0.0 }
    }

    /// Unit vector perpendicular to the ped's facing, on the ground plane.
    fn lateral(&self, ped: &PedState) -> Vec3 {
        let offset = match self.params.direction {
            ShimmyDirection::Left => 90.0,
            ShimmyDirection::Right => -90.0,
        };
        let yaw = (ped.rotation.yaw + offset).to_radians();
        Vec3::new(yaw.cos(), yaw.sin(), 0.0)
    }
}

impl OneShotBehavior for ShimmyTask {
    fn prepare(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) -> Result<(), String> {
        if !self.params.check_obstacles {
            return Ok(());
        }
        let geometry = ctx.world.geometry().map_err(|err| err.to_string())?;
        let lateral = self.lateral(ctx.ped);
        let end = ctx.ped.position + lateral * self.params.distance;
        if !geometry.clear_line(ctx.ped.position, end) {
            return Err("shimmy path blocked".to_owned());
        }
        Ok(())
    }

    fn apply_instantly(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) -> TickOutcome {
        let lateral = self.lateral(ctx.ped);
        ctx.ped.position += lateral * self.params.distance;
        self.moved = self.params.distance;
        TickOutcome::done("shimmy complete")
    }

    fn advance(
        &mut self,
        _state: &mut TaskState,
        progress: &mut f32,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        let remaining = self.params.distance - self.moved;
        let step = (self.params.speed * dt).min(remaining);
        let lateral = self.lateral(ctx.ped);

        if self.params.check_obstacles {
            let geometry = match ctx.world.geometry() {
                Ok(geometry) => geometry,
                Err(err) => return TickOutcome::fail(err.to_string()),
            };
            let ahead = ctx.ped.position + lateral * step;
            if !geometry.clear_line(ctx.ped.position, ahead) {
                return TickOutcome::fail("shimmy path blocked");
            }
        }

        ctx.ped.position += lateral * step;
        self.moved += step;
        *progress = (self.moved / self.params.distance.max(f32::EPSILON)).min(1.0);

        if self.moved + f32::EPSILON >= self.params.distance {
            TickOutcome::done("shimmy complete")
        } else {
            TickOutcome::Continue
        }
    }
}

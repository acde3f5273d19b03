//! Approach and enter a vehicle seat.

use super::{ComplexBehavior, TaskPhase};
use crate::kinds::TickOutcome;
use crate::math::Vec3;
use crate::state::Posture;
use crate::task::{TaskContext, TaskState};

/// Seconds spent opening the door before sliding in.
const DOOR_OPEN_TIME: f32 = 0.6;
const DOOR_EPSILON: f32 = 0.3;
const SEAT_EPSILON: f32 = 0.05;

#[derive(Clone, Copy, Debug)]
pub struct EnterVehicleParams {
    /// Seat to occupy: 0/1 front left/right, 2/3 rear left/right.
    pub seat_index: u8,
    /// Walk speed while approaching the door.
    pub approach_speed: f32,
}

impl Default for EnterVehicleParams {
    fn default() -> Self {
        Self {
            seat_index: 0,
            approach_speed: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct SeatAnchors {
    door: Vec3,
    seat: Vec3,
}

#[derive(Clone, Debug)]
pub struct EnterVehicleTask {
    params: EnterVehicleParams,
    anchors: Option<SeatAnchors>,
    door_open: f32,
}

impl EnterVehicleTask {
    pub fn new(params: EnterVehicleParams) -> Self {
        Self {
            params,
            anchors: None,
            door_open: 0.0,
        }
    }

    /// Door and seat offsets in vehicle-local axes (the snapshot carries no
    /// orientation, so local axes coincide with world axes).
    fn seat_anchors(vehicle: Vec3, seat_index: u8) -> SeatAnchors {
        let side = if seat_index % 2 == 0 { -1.0 } else { 1.0 };
        let row = 0.5 - (seat_index / 2) as f32;
        SeatAnchors {
            door: vehicle + Vec3::new(side * 1.1, row, 0.0),
            seat: vehicle + Vec3::new(side * 0.45, row, 0.1),
        }
    }
}

impl ComplexBehavior for EnterVehicleTask {
    fn prepare(&mut self, state: &mut TaskState, ctx: &mut TaskContext<'_>) -> Result<(), String> {
        if self.params.seat_index >= 4 {
            return Err("invalid seat index".to_owned());
        }
        let vehicle = state
            .target
            .ok_or_else(|| "no vehicle bound".to_owned())?;
        let snapshot = ctx.world.actor(vehicle).map_err(|err| err.to_string())?;
        self.anchors = Some(Self::seat_anchors(
            snapshot.position,
            self.params.seat_index,
        ));
        Ok(())
    }

    fn execute_phase(
        &mut self,
        phase: TaskPhase,
        state: &mut TaskState,
        dt: f32,
        ctx: &mut TaskContext<'_>,
    ) -> TickOutcome {
        let anchors = match self.anchors {
            Some(anchors) => anchors,
            None => return TickOutcome::fail("enter-vehicle was not prepared"),
        };

        match phase {
            TaskPhase::Preparation => {
                let step = self.params.approach_speed * dt;
                let direction = (anchors.door - ctx.ped.position).normalized();
                ctx.ped.position = ctx.ped.position.move_towards(anchors.door, step);
                if direction != Vec3::ZERO {
                    ctx.ped.rotation.yaw = direction.yaw_degrees();
                }
            }
            TaskPhase::Execution => {
                // Open the door, then slide toward the seat.
                self.door_open += dt;
                if self.door_open >= DOOR_OPEN_TIME {
                    let step = self.params.approach_speed * 0.5 * dt;
                    ctx.ped.position = ctx.ped.position.move_towards(anchors.seat, step);
                }
            }
            TaskPhase::Completion => {
                ctx.ped.position = anchors.seat;
                ctx.ped.posture = Posture::Seated;
                ctx.ped.seated_in = state.target;
            }
            TaskPhase::Cleanup => {
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
            TaskPhase::Preparation => ctx.ped.position.distance(anchors.door) <= DOOR_EPSILON,
            TaskPhase::Execution => {
                self.door_open >= DOOR_OPEN_TIME
                    && ctx.ped.position.distance(anchors.seat) <= SEAT_EPSILON
            }
            TaskPhase::Completion => ctx.ped.posture == Posture::Seated,
            TaskPhase::Cleanup => true,
        }
    }

    fn validate(&self, state: &TaskState, ctx: &TaskContext<'_>) -> bool {
        state
            .target
            .map(|vehicle| ctx.world.actor(vehicle).is_ok())
            .unwrap_or(false)
    }

    fn cleanup(&mut self, _state: &mut TaskState, ctx: &mut TaskContext<'_>) {
        ctx.ped.velocity = Vec3::ZERO;
    }

    fn finished_message(&self) -> &'static str {
        "entered vehicle"
    }
}

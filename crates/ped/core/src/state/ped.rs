//! Per-ped behavior state mutated by the running task.
//!
//! `PedState` is the only piece of world state a task is allowed to mutate,
//! and only while it occupies its owner's current slot. Everything else is
//! observed read-only through the world oracles.

use crate::math::{Rotator, Vec3};
use crate::state::common::{PedId, ResourceMeter};

/// Gross body situation of a ped, driven by the running task.
///
/// Consumers (animation selection) branch on this plus the task events; the
/// engine itself only uses it for condition checks such as "still hanging".
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
pub enum Posture {
    #[default]
    Standing,
    Airborne,
    Hanging,
    Climbing,
    Seated,
}

/// Externally-visible behavior state of one ped.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PedState {
    pub id: PedId,
    pub position: Vec3,
    pub rotation: Rotator,
    pub velocity: Vec3,
    pub health: ResourceMeter,
    pub stamina: ResourceMeter,
    pub posture: Posture,
    /// Vehicle (or mount) currently occupied, if any.
    pub seated_in: Option<PedId>,
    pub armed: bool,
}

impl PedState {
    pub fn new(id: PedId, position: Vec3) -> Self {
        Self {
            id,
            position,
            rotation: Rotator::default(),
            velocity: Vec3::ZERO,
            health: ResourceMeter::full(100.0),
            stamina: ResourceMeter::full(100.0),
            posture: Posture::Standing,
            seated_in: None,
            armed: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// Facing direction projected from the current rotation (unit length).
    pub fn facing(&self) -> Vec3 {
        let yaw = self.rotation.yaw.to_radians();
        let pitch = self.rotation.pitch.to_radians();
        Vec3::new(
            yaw.cos() * pitch.cos(),
            yaw.sin() * pitch.cos(),
            pitch.sin(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_tracks_yaw() {
        let mut ped = PedState::new(PedId(1), Vec3::ZERO);
        ped.rotation.yaw = 90.0;
        let facing = ped.facing();
        assert!(facing.x.abs() < 1e-5);
        assert!((facing.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn posture_round_trips_through_strings() {
        use std::str::FromStr;
        assert_eq!(Posture::Hanging.to_string(), "hanging");
        assert_eq!(Posture::from_str("seated").unwrap(), Posture::Seated);
    }
}

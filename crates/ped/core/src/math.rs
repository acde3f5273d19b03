//! Minimal float math for continuous ped movement.
//!
//! Tasks steer peds through world space, so unlike the tile-based types in
//! `state`, these are plain `f32` vectors and rotators with just the helpers
//! the concrete tasks need. No external math crate is pulled in for this.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// World-space position or direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const UP: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Distance ignoring the vertical axis.
    pub fn horizontal_distance(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Unit-length copy, or `Vec3::ZERO` for a degenerate vector.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len, self.z / len)
        }
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    /// Step at most `max_step` toward `goal`, never overshooting.
    pub fn move_towards(self, goal: Self, max_step: f32) -> Self {
        let delta = goal - self;
        let dist = delta.length();
        if dist <= max_step || dist <= f32::EPSILON {
            goal
        } else {
            self + delta * (max_step / dist)
        }
    }

    /// Yaw (degrees) of this direction projected onto the ground plane.
    pub fn yaw_degrees(self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Facing expressed as pitch/yaw/roll in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Rotator {
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Rotator that faces along `direction`.
    ///
    /// A zero-length direction yields the identity rotator.
    pub fn facing(direction: Vec3) -> Self {
        let dir = direction.normalized();
        if dir == Vec3::ZERO {
            return Self::default();
        }
        let yaw = dir.yaw_degrees();
        let horizontal = (dir.x * dir.x + dir.y * dir.y).sqrt();
        let pitch = dir.z.atan2(horizontal).to_degrees();
        Self::new(pitch, yaw, 0.0)
    }

    /// Copy with pitch and roll zeroed (yaw-only facing).
    pub fn horizontal(self) -> Self {
        Self::new(0.0, self.yaw, 0.0)
    }

    /// Angular distance to `other` in degrees, using shortest arcs per axis.
    pub fn angle_to(self, other: Self) -> f32 {
        let dp = wrap_degrees(other.pitch - self.pitch).abs();
        let dy = wrap_degrees(other.yaw - self.yaw).abs();
        let dr = wrap_degrees(other.roll - self.roll).abs();
        dp.max(dy).max(dr)
    }

    /// Rotate toward `goal` by at most `max_step` degrees per axis.
    ///
    /// Returns the new rotator and the largest arc actually traversed.
    pub fn rotate_towards(self, goal: Self, max_step: f32) -> (Self, f32) {
        let (pitch, ap) = step_angle(self.pitch, goal.pitch, max_step);
        let (yaw, ay) = step_angle(self.yaw, goal.yaw, max_step);
        let (roll, ar) = step_angle(self.roll, goal.roll, max_step);
        (Self::new(pitch, yaw, roll), ap.max(ay).max(ar))
    }
}

/// Wrap an angle delta into [-180, 180] degrees.
pub fn wrap_degrees(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a < -180.0 {
        a += 360.0;
    }
    a
}

fn step_angle(current: f32, goal: f32, max_step: f32) -> (f32, f32) {
    let delta = wrap_degrees(goal - current);
    if delta.abs() <= max_step {
        (goal, delta.abs())
    } else {
        (current + max_step.copysign(delta), max_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_towards_never_overshoots() {
        let start = Vec3::ZERO;
        let goal = Vec3::new(10.0, 0.0, 0.0);
        let stepped = start.move_towards(goal, 4.0);
        assert_eq!(stepped, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(stepped.move_towards(goal, 100.0), goal);
    }

    #[test]
    fn facing_is_horizontal_for_flat_directions() {
        let rot = Rotator::facing(Vec3::new(0.0, 1.0, 0.0));
        assert!((rot.yaw - 90.0).abs() < 1e-4);
        assert!(rot.pitch.abs() < 1e-4);
    }

    #[test]
    fn rotate_towards_takes_shortest_arc() {
        let current = Rotator::new(0.0, 170.0, 0.0);
        let goal = Rotator::new(0.0, -170.0, 0.0);
        let (next, arc) = current.rotate_towards(goal, 10.0);
        assert!((arc - 10.0).abs() < 1e-4);
        assert!((wrap_degrees(next.yaw) - 180.0).abs() < 1e-3 || next.yaw > 170.0);
    }

    #[test]
    fn wrap_degrees_bounds() {
        assert_eq!(wrap_degrees(270.0), -90.0);
        assert_eq!(wrap_degrees(-270.0), 90.0);
    }
}

//! Geometry query oracle.
//!
//! Concrete tasks consult geometry to answer questions like "is the ledge
//! within reach" or "is the landing safe". Every query is a pure
//! hit-or-no-hit probe returning an optional location; the engine performs
//! no raycasting of its own.

use crate::math::Vec3;

/// Read-only geometry queries supplied by the embedding game.
pub trait GeometryOracle: Send + Sync + std::fmt::Debug {
    /// Returns true if the straight segment from `from` to `to` is
    /// unobstructed.
    fn clear_line(&self, from: Vec3, to: Vec3) -> bool;

    /// Nearest grabbable ledge to `origin` within `range`, if any.
    fn nearest_ledge(&self, origin: Vec3, range: f32) -> Option<Vec3>;

    /// Height of the walkable surface at the horizontal location of `at`.
    fn surface_height(&self, at: Vec3) -> Option<f32>;

    /// Landing point for a drop of up to `max_drop` below `from`, if the
    /// landing is considered safe.
    fn safe_landing(&self, from: Vec3, max_drop: f32) -> Option<Vec3>;

    /// A cover location near `near` that blocks line of sight from `threat`.
    fn cover_point(&self, near: Vec3, threat: Vec3) -> Option<Vec3>;
}

/// Geometry oracle for open, flat ground.
///
/// Every line is clear, the surface is the z=0 plane, any drop lands, and
/// there is no cover and no ledge. Useful as a default and in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenGround;

impl GeometryOracle for OpenGround {
    fn clear_line(&self, _from: Vec3, _to: Vec3) -> bool {
        true
    }

    fn nearest_ledge(&self, _origin: Vec3, _range: f32) -> Option<Vec3> {
        None
    }

    fn surface_height(&self, _at: Vec3) -> Option<f32> {
        Some(0.0)
    }

    fn safe_landing(&self, from: Vec3, max_drop: f32) -> Option<Vec3> {
        Some(Vec3::new(from.x, from.y, (from.z - max_drop).max(0.0)))
    }

    fn cover_point(&self, _near: Vec3, _threat: Vec3) -> Option<Vec3> {
        None
    }
}

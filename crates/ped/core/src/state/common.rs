use std::fmt;

/// Unique identifier for any ped or world object referenced by tasks.
///
/// Handles are opaque: the engine never resolves them itself, it only passes
/// them to the world oracles supplied by the embedding game.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct PedId(pub u32);

impl PedId {
    /// Reserved identifier for the controllable player character.
    pub const PLAYER: Self = Self(0);

    /// Reserved "no entity" sentinel.
    ///
    /// Construction helpers reject it so a task can never be bound to a
    /// nonexistent owner.
    pub const NONE: Self = Self(u32::MAX);

    /// Returns true if this handle is the reserved empty sentinel.
    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Returns true if this entity represents the player.
    #[inline]
    pub const fn is_player(self) -> bool {
        self.0 == Self::PLAYER.0
    }
}

impl fmt::Display for PedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for a task instance, assigned by the factory.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Float resource meter (health, stamina) tracked per ped.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResourceMeter {
    pub current: f32,
    pub maximum: f32,
}

impl ResourceMeter {
    pub fn new(current: f32, maximum: f32) -> Self {
        Self {
            current: current.clamp(0.0, maximum.max(0.0)),
            maximum: maximum.max(0.0),
        }
    }

    pub fn full(maximum: f32) -> Self {
        Self::new(maximum, maximum)
    }

    /// Fraction remaining in [0, 1]; empty meters report 0.
    pub fn ratio(&self) -> f32 {
        if self.maximum <= f32::EPSILON {
            0.0
        } else {
            (self.current / self.maximum).clamp(0.0, 1.0)
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= f32::EPSILON
    }

    /// Remove `amount`, clamping at zero. Negative amounts are ignored.
    pub fn drain(&mut self, amount: f32) {
        if amount > 0.0 {
            self.current = (self.current - amount).max(0.0);
        }
    }

    /// Add `amount`, clamping at the maximum. Negative amounts are ignored.
    pub fn restore(&mut self, amount: f32) {
        if amount > 0.0 {
            self.current = (self.current + amount).min(self.maximum);
        }
    }
}

impl Default for ResourceMeter {
    fn default() -> Self {
        Self::full(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_drain_clamps_at_zero() {
        let mut meter = ResourceMeter::full(50.0);
        meter.drain(80.0);
        assert!(meter.is_depleted());
        assert_eq!(meter.current, 0.0);
    }

    #[test]
    fn meter_restore_clamps_at_maximum() {
        let mut meter = ResourceMeter::new(10.0, 50.0);
        meter.restore(1000.0);
        assert_eq!(meter.current, 50.0);
        assert_eq!(meter.ratio(), 1.0);
    }

    #[test]
    fn none_sentinel_is_detected() {
        assert!(PedId::NONE.is_none());
        assert!(!PedId::PLAYER.is_none());
    }
}

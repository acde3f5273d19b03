//! Read-only actor observation.
//!
//! Targets are observed through snapshots so a task can read its opponent
//! while the scheduler mutates other peds. A snapshot carries only the
//! attributes the concrete tasks actually consume.

use crate::math::Vec3;
use crate::state::{PedId, PedState};

/// Point-in-time view of another entity, as seen by a task.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ActorSnapshot {
    pub id: PedId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Health fraction in [0, 1].
    pub health: f32,
    pub alive: bool,
    pub aggressive: bool,
    pub blocking: bool,
    /// Fatigue fraction in [0, 1]; 1 means exhausted.
    pub fatigue: f32,
    pub armed: bool,
}

impl ActorSnapshot {
    /// Snapshot taken from a full ped state.
    pub fn of(ped: &PedState) -> Self {
        Self {
            id: ped.id,
            position: ped.position,
            velocity: ped.velocity,
            health: ped.health.ratio(),
            alive: ped.is_alive(),
            aggressive: false,
            blocking: false,
            fatigue: 1.0 - ped.stamina.ratio(),
            armed: ped.armed,
        }
    }

    pub fn with_aggressive(mut self, aggressive: bool) -> Self {
        self.aggressive = aggressive;
        self
    }

    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }
}

/// Read-only lookup of actor snapshots by handle.
pub trait ActorOracle: Send + Sync + std::fmt::Debug {
    fn actor(&self, id: PedId) -> Option<ActorSnapshot>;
}

/// Actor oracle backed by a fixed set of snapshots.
///
/// The runtime rebuilds one of these every scheduling tick; tests populate it
/// by hand.
#[derive(Clone, Debug, Default)]
pub struct ActorsSnapshot {
    actors: std::collections::BTreeMap<PedId, ActorSnapshot>,
}

impl ActorsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snapshot: ActorSnapshot) {
        self.actors.insert(snapshot.id, snapshot);
    }

    pub fn from_peds<'a>(peds: impl IntoIterator<Item = &'a PedState>) -> Self {
        let mut snapshot = Self::new();
        for ped in peds {
            snapshot.insert(ActorSnapshot::of(ped));
        }
        snapshot
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl ActorOracle for ActorsSnapshot {
    fn actor(&self, id: PedId) -> Option<ActorSnapshot> {
        self.actors.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_lookup_by_handle() {
        let ped = PedState::new(PedId(7), Vec3::new(1.0, 2.0, 0.0));
        let actors = ActorsSnapshot::from_peds([&ped]);
        let seen = actors.actor(PedId(7)).unwrap();
        assert_eq!(seen.position, ped.position);
        assert!(seen.alive);
        assert!(actors.actor(PedId(8)).is_none());
    }
}

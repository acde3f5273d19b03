//! Traits describing read-only world data.
//!
//! Oracles expose geometry probes, actor snapshots, and deterministic
//! randomness. The [`WorldEnv`] aggregate bundles them so concrete tasks can
//! reach their collaborators without hard coupling; the base Task/Manager
//! machinery never touches any of them.
mod actors;
mod error;
mod geometry;
mod rng;

pub use actors::{ActorOracle, ActorSnapshot, ActorsSnapshot};
pub use error::OracleError;
pub use geometry::{GeometryOracle, OpenGround};
pub use rng::{PcgRng, RngOracle, compute_seed};

/// Aggregates the read-only oracles a task may consult during a tick.
///
/// Every collaborator is optional; a task that needs a missing one fails
/// with the corresponding [`OracleError`] instead of guessing.
#[derive(Clone, Copy)]
pub struct WorldEnv<'a> {
    geometry: Option<&'a dyn GeometryOracle>,
    actors: Option<&'a dyn ActorOracle>,
    rng: Option<&'a dyn RngOracle>,
}

impl<'a> WorldEnv<'a> {
    pub fn new(
        geometry: Option<&'a dyn GeometryOracle>,
        actors: Option<&'a dyn ActorOracle>,
        rng: Option<&'a dyn RngOracle>,
    ) -> Self {
        Self {
            geometry,
            actors,
            rng,
        }
    }

    pub fn with_all(
        geometry: &'a dyn GeometryOracle,
        actors: &'a dyn ActorOracle,
        rng: &'a dyn RngOracle,
    ) -> Self {
        Self::new(Some(geometry), Some(actors), Some(rng))
    }

    pub fn empty() -> Self {
        Self {
            geometry: None,
            actors: None,
            rng: None,
        }
    }

    /// Returns the GeometryOracle, or an error if not available.
    pub fn geometry(&self) -> Result<&'a dyn GeometryOracle, OracleError> {
        self.geometry.ok_or(OracleError::GeometryNotAvailable)
    }

    /// Returns the ActorOracle, or an error if not available.
    pub fn actors(&self) -> Result<&'a dyn ActorOracle, OracleError> {
        self.actors.ok_or(OracleError::ActorsNotAvailable)
    }

    /// Returns the RngOracle, or an error if not available.
    pub fn rng(&self) -> Result<&'a dyn RngOracle, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Snapshot of `id`, or an error naming what was missing.
    pub fn actor(&self, id: crate::state::PedId) -> Result<ActorSnapshot, OracleError> {
        self.actors()?
            .actor(id)
            .ok_or(OracleError::ActorNotFound(id))
    }
}

impl std::fmt::Debug for WorldEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldEnv")
            .field("geometry", &self.geometry.is_some())
            .field("actors", &self.actors.is_some())
            .field("rng", &self.rng.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PedId;

    #[test]
    fn missing_oracles_surface_typed_errors() {
        let env = WorldEnv::empty();
        assert_eq!(
            env.geometry().unwrap_err(),
            OracleError::GeometryNotAvailable
        );
        assert_eq!(env.actors().unwrap_err(), OracleError::ActorsNotAvailable);
        assert_eq!(env.rng().unwrap_err(), OracleError::RngNotAvailable);
    }

    #[test]
    fn actor_lookup_reports_missing_entity() {
        let actors = ActorsSnapshot::new();
        let env = WorldEnv::new(None, Some(&actors), None);
        assert_eq!(
            env.actor(PedId(3)).unwrap_err(),
            OracleError::ActorNotFound(PedId(3))
        );
    }
}

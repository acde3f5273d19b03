//! Oracle access errors.

use crate::error::{ErrorSeverity, PedError};
use crate::state::PedId;

/// Errors that occur when accessing world oracle data.
///
/// Missing oracles are fatal for the task that needed them: a concrete task
/// cannot probe geometry or read a target without its collaborator. The base
/// Task/Manager machinery never raises these.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum OracleError {
    /// GeometryOracle is not available in the environment.
    #[error("GeometryOracle not available")]
    GeometryNotAvailable,

    /// ActorOracle is not available in the environment.
    #[error("ActorOracle not available")]
    ActorsNotAvailable,

    /// RngOracle is not available in the environment.
    #[error("RngOracle not available")]
    RngNotAvailable,

    /// No snapshot exists for the requested actor.
    #[error("actor {0} not found")]
    ActorNotFound(PedId),
}

impl PedError for OracleError {
    fn severity(&self) -> ErrorSeverity {
        use OracleError::*;
        match self {
            GeometryNotAvailable | ActorsNotAvailable | RngNotAvailable => ErrorSeverity::Fatal,
            ActorNotFound(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        use OracleError::*;
        match self {
            GeometryNotAvailable => "ORACLE_GEOMETRY_NOT_AVAILABLE",
            ActorsNotAvailable => "ORACLE_ACTORS_NOT_AVAILABLE",
            RngNotAvailable => "ORACLE_RNG_NOT_AVAILABLE",
            ActorNotFound(_) => "ORACLE_ACTOR_NOT_FOUND",
        }
    }
}

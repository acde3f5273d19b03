//! Common error infrastructure.
//!
//! Domain-specific errors (`OracleError`, `BuildError`) live next to the code
//! that raises them; this module provides the shared severity classification
//! they all implement.

/// Severity level of an error, used for categorization and recovery strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// Recoverable error - can retry with same or alternative input.
    ///
    /// Examples: target momentarily out of range, no cover point found
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: missing required target, unknown task class
    Validation,

    /// Fatal error - a required collaborator is missing, cannot continue.
    ///
    /// Examples: oracle absent from the environment
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for engine errors.
///
/// Implemented with `#[derive(thiserror::Error)]` providing Display; this
/// trait adds the classification used by logging and recovery code.
pub trait PedError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for categorization, metrics, and testing.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// error.rs - Error taxonomy for the survey core

use thiserror::Error;

/// Errors raised by the alignment, clustering and balancing core.
///
/// Loaders, writers and the run cache keep plain `String` errors; this enum
/// only covers conditions the core itself can detect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    /// Caller supplied data the core cannot work with. Raised before any
    /// alignment is attempted.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal consistency check failed (e.g. an empty family reached the
    /// balancer). Indicates a bug, never a data problem.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, SurveyError>;

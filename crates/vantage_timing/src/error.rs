//! Error types for path and cone queries.
//!
//! Empty results and missing timing data are not errors: they come back as
//! empty collections and as nodes with `has_values() == false`. The variants
//! here cover a missing collaborator and handles or pins the collaborators do
//! not know, which indicate an integration bug on the caller's side.

use vantage_common::{PathHandle, PinId};

/// The result type of every query operation.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors reported by path and cone queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// No timing engine is bound to the query service.
    #[error("no timing engine configured")]
    NoEngine,

    /// No design database is bound to the query service.
    #[error("no design database configured")]
    NoDatabase,

    /// The timing engine does not know this pin.
    #[error("unknown pin {0:?}")]
    UnknownPin(PinId),

    /// The timing engine does not know this path handle.
    #[error("unknown path handle {0:?}")]
    UnknownPath(PathHandle),

    /// The timing pin has no counterpart in the design database.
    #[error("pin {0:?} has no database counterpart")]
    UnmappedPin(PinId),

    /// The configured corner does not exist in the timing engine.
    #[error("unknown corner '{0}'")]
    UnknownCorner(String),

    /// No corner was configured and the engine has no default corner.
    #[error("timing engine has no default corner")]
    NoCorner,
}

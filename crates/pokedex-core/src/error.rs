//! Error types for the catalog store and battle session.
//!
//! Every failure is surfaced to the caller through these enums; the only
//! thing the crate drops on purpose is a stale battle response, which is
//! reported as [`TurnApplication::Discarded`](crate::session::TurnApplication)
//! rather than as an error.

use pokedex_types::{CreatureId, Phase};

/// Errors raised at the service boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The request never produced a response (connection, DNS, TLS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The request exceeded the configured deadline.
    #[error("request timed out after {0}ms")]
    Timeout(u64),
}

/// Why the catalog could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogFailure {
    /// The service could not be reached or refused the request.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The body contained a line that is not `name:spriteKey`.
    #[error("malformed line {line}: {content:?}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },
}

/// Errors raised by the catalog store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The catalog could not be fetched or parsed.
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(#[from] CatalogFailure),

    /// The creature is unknown or has not been found yet.
    #[error("creature not available: {0}")]
    NotFound(CreatureId),
}

impl From<ServiceError> for CatalogError {
    fn from(error: ServiceError) -> Self {
        Self::CatalogUnavailable(CatalogFailure::Service(error))
    }
}

/// Errors raised by battle session operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A battle request failed; session state is unchanged.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// A request for this session is already in flight.
    #[error("session busy: a request is already in flight")]
    SessionBusy,

    /// The operation is not allowed in the current phase.
    #[error("illegal transition: {operation} while {phase}")]
    IllegalTransition {
        /// The operation that was attempted.
        operation: &'static str,
        /// The phase the session was in.
        phase: Phase,
    },

    /// The chosen creature is unknown or has not been found yet.
    #[error("creature not available: {0}")]
    NotFound(CreatureId),

    /// The move is not one of the player's creature's moves.
    #[error("unknown move: {0}")]
    UnknownMove(String),
}

impl From<CatalogError> for SessionError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound(id) => Self::NotFound(id),
            CatalogError::CatalogUnavailable(CatalogFailure::Service(service)) => {
                Self::Service(service)
            }
            CatalogError::CatalogUnavailable(CatalogFailure::Malformed { line, content }) => {
                Self::Service(ServiceError::Decode(format!(
                    "malformed catalog line {line}: {content:?}"
                )))
            }
        }
    }
}

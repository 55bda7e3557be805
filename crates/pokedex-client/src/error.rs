//! Error types for the service client and runner.
//!
//! Service-level failures are reported as [`ServiceError`] so they flow
//! through the core crate unchanged; [`ClientError`] covers configuration
//! and wraps core errors for the runner.

use pokedex_core::{CatalogError, ServiceError, SessionError};

/// Errors that can occur while configuring or running the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// The HTTP client could not be built.
    #[error("http client error: {0}")]
    Http(String),

    /// Loading the catalog or a creature failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A battle operation failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Map a `reqwest` failure onto the service error taxonomy.
pub(crate) fn transport_error(error: &reqwest::Error) -> ServiceError {
    if error.is_timeout() {
        ServiceError::Transport(format!("request timed out: {error}"))
    } else {
        ServiceError::Transport(error.to_string())
    }
}

//! Error types for the dockdock service.

use dockdock_search::SearchError;

/// Errors raised while configuring or starting the service.
///
/// Per-request failures are rendered by [`crate::server::ApiError`] instead.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The search pipeline could not be set up.
    #[error("search setup error: {0}")]
    Search(#[from] SearchError),

    /// The HTTP server failed to bind or crashed.
    #[error("server error: {0}")]
    Server(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ServiceError>;

//! Error types for the dockdock-search crate.
//!
//! Only failures of the search request itself, or of the search invocation
//! as a whole, are represented here. A single candidate whose
//! `docker-compose.yml` cannot be fetched is never an error; see
//! [`crate::artifact::ArtifactResult`].
//!
//! Messages never contain the upstream credential.

/// Stable, machine-readable error kinds.
///
/// These strings appear in the `error` field of the service's JSON error
/// bodies and do not change between releases.
pub mod error_kinds {
    /// The search endpoint could not be reached (DNS, connect, timeout).
    pub const UPSTREAM_UNREACHABLE: &str = "upstream_unreachable";
    /// The search endpoint answered 403 (rate limit or credential rejected).
    pub const UPSTREAM_RATE_LIMITED: &str = "upstream_rate_limited";
    /// The search endpoint answered with some other non-success status.
    pub const UPSTREAM_REJECTED: &str = "upstream_rejected";
    /// The whole search invocation exceeded its deadline.
    pub const TIMEOUT: &str = "timeout";
    /// Search criteria were missing or out of range.
    pub const VALIDATION: &str = "validation_error";
    /// Invalid search configuration.
    pub const CONFIG: &str = "config_error";
    /// The search endpoint answered 2xx with a body that could not be parsed.
    pub const PARSE: &str = "parse_error";
}

/// Errors that abort a search invocation.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The search endpoint could not be contacted.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The search endpoint refused the request with HTTP 403.
    #[error("upstream rate limit exceeded or access denied: {0}")]
    UpstreamRateLimited(String),

    /// The search endpoint answered with a non-success status other than 403.
    #[error("upstream rejected the request with HTTP {status}")]
    UpstreamRejected {
        /// Upstream HTTP status code, passed through to the caller.
        status: u16,
        /// Raw upstream response body.
        body: String,
    },

    /// The search did not finish before its deadline; in-flight work was abandoned.
    #[error("search timed out: {0}")]
    Timeout(String),

    /// Search criteria failed validation before any upstream call.
    #[error("invalid search criteria: {0}")]
    Validation(String),

    /// Invalid search configuration.
    #[error("config error: {0}")]
    Config(String),

    /// A successful upstream response had an unexpected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl SearchError {
    /// Returns the stable kind string for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UpstreamUnreachable(_) => error_kinds::UPSTREAM_UNREACHABLE,
            Self::UpstreamRateLimited(_) => error_kinds::UPSTREAM_RATE_LIMITED,
            Self::UpstreamRejected { .. } => error_kinds::UPSTREAM_REJECTED,
            Self::Timeout(_) => error_kinds::TIMEOUT,
            Self::Validation(_) => error_kinds::VALIDATION,
            Self::Config(_) => error_kinds::CONFIG,
            Self::Parse(_) => error_kinds::PARSE,
        }
    }

    /// Returns the HTTP status a front end should answer with for this error.
    ///
    /// Rejections other than 403 pass the upstream status through unchanged.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UpstreamUnreachable(_) => 503,
            Self::UpstreamRateLimited(_) => 403,
            Self::UpstreamRejected { status, .. } => *status,
            Self::Timeout(_) => 504,
            Self::Validation(_) => 422,
            Self::Config(_) => 500,
            Self::Parse(_) => 502,
        }
    }
}

/// Convenience type alias for dockdock-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] is built once at process start and passed by reference
//! into everything that talks to the upstream API. Nothing in this crate
//! reads the environment.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Public GitHub REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// File fetched from every candidate repository.
pub const DEFAULT_ARTIFACT_PATH: &str = "docker-compose.yml";

/// Configuration for the search-and-enrich pipeline.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Base URL of the upstream API, without a trailing slash.
    pub api_base_url: String,
    /// Optional bearer credential sent with every upstream request.
    pub token: Option<String>,
    /// Maximum number of artifact fetches in flight at once.
    pub concurrency_limit: usize,
    /// Random pause range in milliseconds `(min, max)` taken before each
    /// artifact fetch is admitted. `(0, 0)` disables it; equal bounds give a
    /// fixed pause.
    pub politeness_delay_ms: (u64, u64),
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Deadline for one whole search invocation, in seconds.
    pub search_timeout_seconds: u64,
    /// User-Agent sent upstream. GitHub rejects requests without one.
    pub user_agent: String,
    /// Repository-relative path of the artifact to fetch.
    pub artifact_path: String,
    /// Upstream sort key; results are always requested in descending order.
    pub sort_key: String,
    /// Longest upstream rate-limit backoff an artifact fetch will wait out.
    /// Fetches admitted under a longer backoff are skipped. Must be shorter
    /// than `search_timeout_seconds`.
    pub max_rate_limit_wait_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            token: None,
            concurrency_limit: 5,
            politeness_delay_ms: (0, 0),
            timeout_seconds: 10,
            search_timeout_seconds: 30,
            user_agent: "DockDockGo-App".to_owned(),
            artifact_path: DEFAULT_ARTIFACT_PATH.to_owned(),
            sort_key: "stars".to_owned(),
            max_rate_limit_wait_seconds: 5,
        }
    }
}

impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("api_base_url", &self.api_base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("concurrency_limit", &self.concurrency_limit)
            .field("politeness_delay_ms", &self.politeness_delay_ms)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("search_timeout_seconds", &self.search_timeout_seconds)
            .field("user_agent", &self.user_agent)
            .field("artifact_path", &self.artifact_path)
            .field("sort_key", &self.sort_key)
            .field("max_rate_limit_wait_seconds", &self.max_rate_limit_wait_seconds)
            .finish()
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `api_base_url` must be an absolute `http` or `https` URL
    /// - `concurrency_limit`, `timeout_seconds` and `search_timeout_seconds` must be > 0
    /// - `max_rate_limit_wait_seconds` must be < `search_timeout_seconds`
    /// - `politeness_delay_ms.0` must be <= `politeness_delay_ms.1`
    /// - `user_agent`, `artifact_path` and `sort_key` must not be empty
    pub fn validate(&self) -> Result<(), SearchError> {
        let url = url::Url::parse(&self.api_base_url)
            .map_err(|e| SearchError::Config(format!("api_base_url is not a valid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SearchError::Config(
                "api_base_url must use http or https".into(),
            ));
        }
        if self.concurrency_limit == 0 {
            return Err(SearchError::Config(
                "concurrency_limit must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.search_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "search_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_rate_limit_wait_seconds >= self.search_timeout_seconds {
            return Err(SearchError::Config(
                "max_rate_limit_wait_seconds must be less than search_timeout_seconds".into(),
            ));
        }
        if self.politeness_delay_ms.0 > self.politeness_delay_ms.1 {
            return Err(SearchError::Config(
                "politeness_delay_ms min must be <= max".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(SearchError::Config("user_agent must not be empty".into()));
        }
        if self.artifact_path.trim().is_empty() {
            return Err(SearchError::Config("artifact_path must not be empty".into()));
        }
        if self.sort_key.trim().is_empty() {
            return Err(SearchError::Config("sort_key must not be empty".into()));
        }
        Ok(())
    }

    /// The base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Deadline for one whole search invocation.
    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_seconds)
    }

    /// Cap on how long a fetch waits out an active rate-limit backoff.
    pub fn max_rate_limit_wait(&self) -> Duration {
        Duration::from_secs(self.max_rate_limit_wait_seconds)
    }
}

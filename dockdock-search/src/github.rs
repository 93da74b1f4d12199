//! GitHub REST API implementation of [`CodeHost`].
//!
//! - Search: `GET {base}/search/repositories?q=&sort=&order=desc&page=&per_page=`
//! - Artifact: `GET {base}/repos/{owner}/{name}/contents/{artifact_path}`
//!
//! The artifact fetch makes exactly one request and never retries.

use crate::artifact::{classify_status, decode_content, ArtifactResult};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::host::CodeHost;
use crate::http::build_client;
use crate::rate_limit::{backoff_from_headers, global_signal, RateLimitSignal};
use crate::types::SearchPage;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Body of a contents-endpoint response. Only `content` is used.
#[derive(Debug, Deserialize)]
struct ContentPayload {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// GitHub-backed [`CodeHost`].
///
/// Cheap to share behind an [`Arc`]; the inner HTTP client is already
/// reference counted.
pub struct GitHubHost {
    client: reqwest::Client,
    base_url: String,
    artifact_path: String,
    sort_key: String,
    signal: Arc<RateLimitSignal>,
}

impl fmt::Debug for GitHubHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubHost")
            .field("base_url", &self.base_url)
            .field("artifact_path", &self.artifact_path)
            .field("sort_key", &self.sort_key)
            .finish_non_exhaustive()
    }
}

impl GitHubHost {
    /// Create a host from validated configuration, sharing the process-wide
    /// rate-limit signal.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            client: build_client(config)?,
            base_url: config.base_url().to_owned(),
            artifact_path: config.artifact_path.trim_matches('/').to_owned(),
            sort_key: config.sort_key.clone(),
            signal: global_signal(),
        })
    }

    /// Use `signal` instead of the process-wide one.
    pub fn with_rate_limit_signal(mut self, signal: Arc<RateLimitSignal>) -> Self {
        self.signal = signal;
        self
    }

    fn search_url(&self) -> String {
        format!("{}/search/repositories", self.base_url)
    }

    /// Contents URL for `full_name`, each path segment percent-encoded.
    fn content_url(&self, full_name: &str) -> String {
        let repo = full_name
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/repos/{repo}/contents/{}", self.base_url, self.artifact_path)
    }

    /// Record a backoff if `response` says we are being rate limited.
    fn observe_rate_limit(&self, response: &Response) {
        if let Some(wait) = backoff_from_headers(response.status(), response.headers()) {
            tracing::warn!(
                status = response.status().as_u16(),
                backoff_secs = wait.as_secs(),
                "upstream rate limit reached"
            );
            self.signal.raise_for(wait);
        }
    }

    /// Map a non-success search status to a [`SearchError`].
    fn map_search_error(status: StatusCode, body: String) -> SearchError {
        match status {
            StatusCode::FORBIDDEN => SearchError::UpstreamRateLimited(format!(
                "GitHub API rate limit exceeded or access denied: {}",
                extract_error_message(&body)
            )),
            _ => SearchError::UpstreamRejected {
                status: status.as_u16(),
                body,
            },
        }
    }
}

/// Extract `message` from a GitHub error body, falling back to the raw body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

impl CodeHost for GitHubHost {
    async fn search_repositories(
        &self,
        keyword: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchPage, SearchError> {
        tracing::debug!(page, per_page, sort = %self.sort_key, "requesting search page");

        let response = self
            .client
            .get(self.search_url())
            .query(&[
                ("q", keyword),
                ("sort", self.sort_key.as_str()),
                ("order", "desc"),
                ("page", page.to_string().as_str()),
                ("per_page", per_page.to_string().as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                SearchError::UpstreamUnreachable(format!("failed to connect to GitHub API: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            self.observe_rate_limit(&response);
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_search_error(status, body));
        }

        let body = response.text().await.map_err(|e| {
            SearchError::UpstreamUnreachable(format!("failed to read GitHub search response: {e}"))
        })?;
        serde_json::from_str(&body)
            .map_err(|e| SearchError::Parse(format!("unexpected search response: {e}")))
    }

    async fn fetch_artifact(&self, full_name: &str) -> ArtifactResult {
        let response = match self.client.get(self.content_url(full_name)).send().await {
            Ok(response) => response,
            Err(e) => return ArtifactResult::TransientError(format!("request failed: {e}")),
        };

        let status = response.status();
        if !status.is_success() {
            self.observe_rate_limit(&response);
            return classify_status(status);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ArtifactResult::TransientError(format!("failed to read body: {e}")),
        };
        let payload: ContentPayload = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(e) => {
                return ArtifactResult::FatalError(format!("unexpected contents response: {e}"))
            }
        };

        match (payload.content, payload.encoding.as_deref()) {
            (Some(content), None | Some("base64")) => decode_content(&content),
            (Some(_), Some(other)) => {
                ArtifactResult::FatalError(format!("unsupported content encoding {other:?}"))
            }
            (None, _) => {
                ArtifactResult::FatalError("contents response has no content field".into())
            }
        }
    }

    fn rate_limit_signal(&self) -> Option<&RateLimitSignal> {
        Some(&self.signal)
    }
}

//! Shared HTTP client for upstream API requests.
//!
//! One [`reqwest::Client`] is built per [`crate::GitHubHost`] and shared,
//! read-only, by the search request and every concurrent artifact fetch.
//! The credential lives in the client's default headers, marked sensitive.

use crate::config::SearchConfig;
use crate::error::SearchError;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;

/// Media type for the GitHub REST API v3.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Build a [`reqwest::Client`] configured for the upstream API.
///
/// The client has:
/// - `Accept: application/vnd.github.v3+json`
/// - the configured `User-Agent`
/// - `Authorization: Bearer <token>` when a token is configured
/// - the per-request timeout from config
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the token or User-Agent are not valid
/// header values, or the client cannot be constructed.
pub fn build_client(config: &SearchConfig) -> Result<reqwest::Client, SearchError> {
    reqwest::Client::builder()
        .default_headers(default_headers(config)?)
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()
        .map_err(|e| SearchError::Config(format!("failed to build HTTP client: {e}")))
}

fn default_headers(config: &SearchConfig) -> Result<HeaderMap, SearchError> {
    let mut headers = HeaderMap::new();
    headers.insert(header::ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

    if let Some(token) = config.token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| SearchError::Config("token contains invalid header characters".into()))?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
    }

    Ok(headers)
}

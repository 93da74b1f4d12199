//! # dockdock-search
//!
//! Keyword repository search that only returns repositories carrying a
//! `docker-compose.yml`.
//!
//! ## Design
//!
//! - Searches GitHub repositories by keyword, most-starred first
//! - Checks each candidate for its compose file with bounded parallelism
//! - Drops candidates whose file is missing or cannot be fetched
//! - Walks further pages until enough results exist or the search runs dry
//! - Shares one rate-limit backoff signal across concurrent searches
//!
//! Only a failure of the search request itself fails a search. Individual
//! candidates that cannot be fetched simply do not appear.

pub mod artifact;
pub mod config;
pub mod error;
pub mod github;
pub mod host;
pub mod http;
pub mod pipeline;
pub mod rate_limit;
pub mod types;

pub use artifact::ArtifactResult;
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use github::GitHubHost;
pub use host::CodeHost;
pub use pipeline::enricher::BoundedEnricher;
pub use pipeline::paginator::SearchPaginator;
pub use rate_limit::RateLimitSignal;
pub use types::{EnrichedResult, RepositoryCandidate, SearchCriteria, SearchOutcome, SearchPage};

/// Search GitHub with a host built from `config`.
///
/// Builds a fresh [`GitHubHost`] for this call. Long-lived callers should
/// build the host once and use [`search_with`].
///
/// # Errors
///
/// Returns [`SearchError::Config`] for invalid configuration, otherwise the
/// same errors as [`search_with`].
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> dockdock_search::Result<()> {
/// let config = dockdock_search::SearchConfig::default();
/// let criteria = dockdock_search::SearchCriteria::new("flask", 1, 5)?;
/// let outcome = dockdock_search::search(&criteria, &config).await?;
/// for result in &outcome.results {
///     println!("{}: {} bytes", result.source_identifier, result.artifact_content.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(criteria: &SearchCriteria, config: &SearchConfig) -> Result<SearchOutcome> {
    let host = GitHubHost::new(config)?;
    search_with(&host, criteria, config).await
}

/// Search `host` for repositories matching `criteria` that carry the artifact.
///
/// The whole invocation is bounded by `config.search_timeout_seconds`. On
/// expiry every in-flight request is dropped and no partial outcome is
/// returned.
///
/// # Errors
///
/// - [`SearchError::Config`] if `config` is invalid
/// - [`SearchError::Timeout`] if the deadline passes
/// - any error of the upstream search request
pub async fn search_with<H: CodeHost>(
    host: &H,
    criteria: &SearchCriteria,
    config: &SearchConfig,
) -> Result<SearchOutcome> {
    config.validate()?;
    tracing::info!(
        query = criteria.keyword(),
        page = criteria.page(),
        limit = criteria.limit(),
        "search started"
    );

    let deadline = config.search_timeout();
    let outcome = tokio::time::timeout(deadline, SearchPaginator::new(host, config).run(criteria))
        .await
        .map_err(|_| {
            tracing::warn!(query = criteria.keyword(), "search deadline exceeded");
            SearchError::Timeout(format!("exceeded {}s limit", deadline.as_secs()))
        })??;

    tracing::info!(
        query = criteria.keyword(),
        results = outcome.results.len(),
        total = outcome.total_match_count,
        "search finished"
    );
    Ok(outcome)
}

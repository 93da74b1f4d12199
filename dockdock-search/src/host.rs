//! Trait definition for the upstream code host.
//!
//! The pipeline only needs two operations from the host: one page of
//! keyword search, and the artifact of a single repository.
//! [`crate::GitHubHost`] is the production implementation; tests supply
//! in-memory hosts.

use crate::artifact::ArtifactResult;
use crate::error::SearchError;
use crate::rate_limit::RateLimitSignal;
use crate::types::SearchPage;

/// An upstream code-hosting index.
///
/// All implementations must be `Send + Sync`: one host is shared by every
/// concurrent artifact fetch of a search, and by concurrent searches.
pub trait CodeHost: Send + Sync {
    /// Fetch one page of repositories matching `keyword`, most popular first.
    ///
    /// # Errors
    ///
    /// - [`SearchError::UpstreamUnreachable`] on network failure
    /// - [`SearchError::UpstreamRateLimited`] on HTTP 403
    /// - [`SearchError::UpstreamRejected`] on any other non-success status
    /// - [`SearchError::Parse`] if a success body cannot be parsed
    fn search_repositories(
        &self,
        keyword: &str,
        page: u32,
        per_page: u32,
    ) -> impl std::future::Future<Output = Result<SearchPage, SearchError>> + Send;

    /// Fetch and decode the artifact of the repository `full_name`.
    ///
    /// Infallible by signature: every failure is an [`ArtifactResult`] variant.
    fn fetch_artifact(
        &self,
        full_name: &str,
    ) -> impl std::future::Future<Output = ArtifactResult> + Send;

    /// The rate-limit signal this host raises, if it tracks one.
    fn rate_limit_signal(&self) -> Option<&RateLimitSignal> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RepositoryCandidate;

    struct StaticHost {
        page: SearchPage,
    }

    impl CodeHost for StaticHost {
        async fn search_repositories(
            &self,
            _keyword: &str,
            page: u32,
            _per_page: u32,
        ) -> Result<SearchPage, SearchError> {
            if page == 1 {
                Ok(self.page.clone())
            } else {
                Ok(SearchPage::default())
            }
        }

        async fn fetch_artifact(&self, full_name: &str) -> ArtifactResult {
            if full_name.ends_with("/compose") {
                ArtifactResult::Found("services: {}".into())
            } else {
                ArtifactResult::NotFound
            }
        }
    }

    #[test]
    fn static_host_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StaticHost>();
    }

    #[tokio::test]
    async fn static_host_serves_first_page_only() {
        let host = StaticHost {
            page: SearchPage {
                total_count: 1,
                items: vec![RepositoryCandidate::new("acme/compose", None)],
            },
        };
        let first = host.search_repositories("acme", 1, 10).await.expect("page 1");
        assert_eq!(first.items.len(), 1);
        let second = host.search_repositories("acme", 2, 10).await.expect("page 2");
        assert!(second.items.is_empty());
    }

    #[tokio::test]
    async fn default_host_has_no_rate_limit_signal() {
        let host = StaticHost {
            page: SearchPage::default(),
        };
        assert!(host.rate_limit_signal().is_none());
        assert!(matches!(
            host.fetch_artifact("acme/compose").await,
            ArtifactResult::Found(_)
        ));
        assert_eq!(host.fetch_artifact("acme/other").await, ArtifactResult::NotFound);
    }
}

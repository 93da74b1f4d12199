//! Bounded concurrent artifact probing for one page of candidates.
//!
//! Every candidate gets a fetch future; a [`Semaphore`] admits at most
//! `concurrency_limit` of them at a time and [`futures::future::join_all`]
//! is the join barrier. `join_all` yields outputs in input order, so the
//! enriched results follow upstream rank regardless of which fetch finished
//! first. Nothing is spawned: dropping the returned future abandons every
//! in-flight fetch.

use crate::artifact::ArtifactResult;
use crate::config::SearchConfig;
use crate::host::CodeHost;
use crate::types::{EnrichedResult, RepositoryCandidate};
use rand::Rng;
use std::time::Duration;
use tokio::sync::Semaphore;

/// Fetches each candidate's artifact with bounded parallelism.
pub struct BoundedEnricher<'a, H> {
    host: &'a H,
    concurrency_limit: usize,
    politeness_delay_ms: (u64, u64),
    max_rate_limit_wait: Duration,
}

impl<'a, H: CodeHost> BoundedEnricher<'a, H> {
    /// Build an enricher using the limits from `config`.
    pub fn new(host: &'a H, config: &SearchConfig) -> Self {
        Self {
            host,
            concurrency_limit: config.concurrency_limit.max(1),
            politeness_delay_ms: config.politeness_delay_ms,
            max_rate_limit_wait: config.max_rate_limit_wait(),
        }
    }

    /// Fetch the artifact of every candidate and keep the ones that have it.
    ///
    /// Output order is input order filtered to qualifying candidates.
    /// Candidates whose fetch is `NotFound`, `TransientError` or
    /// `FatalError` are dropped, and so are candidates admitted while an
    /// upstream backoff outlasts `max_rate_limit_wait`. The batch itself
    /// never fails.
    pub async fn enrich(&self, candidates: Vec<RepositoryCandidate>) -> Vec<EnrichedResult> {
        if self.host.rate_limit_signal().is_some_and(|s| s.is_limited()) {
            tracing::debug!(candidates = candidates.len(), "enriching under upstream backoff");
        }
        let semaphore = Semaphore::new(self.concurrency_limit);
        let semaphore = &semaphore;

        let fetches = candidates
            .into_iter()
            .map(|candidate| async move {
                // The semaphore is never closed, so acquire only fails if it were.
                let _permit = semaphore.acquire().await.ok()?;
                if !self.admit().await {
                    tracing::warn!(
                        repo = %candidate.full_name,
                        "upstream backoff outlasts wait cap, skipping candidate"
                    );
                    return None;
                }
                self.fetch_one(candidate).await
            });

        futures::future::join_all(fetches)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Wait out a short upstream backoff, then the politeness delay.
    ///
    /// Returns `false` if the backoff is longer than `max_rate_limit_wait`.
    async fn admit(&self) -> bool {
        if let Some(signal) = self.host.rate_limit_signal() {
            if !signal.wait_out(self.max_rate_limit_wait).await {
                return false;
            }
        }
        let delay = self.politeness_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        true
    }

    fn politeness_delay(&self) -> Duration {
        let (min, max) = self.politeness_delay_ms;
        if max == 0 || min >= max {
            return Duration::from_millis(min);
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    async fn fetch_one(&self, candidate: RepositoryCandidate) -> Option<EnrichedResult> {
        let repo = candidate.full_name.clone();
        match self.host.fetch_artifact(&repo).await {
            ArtifactResult::Found(content) => {
                tracing::debug!(repo = %repo, bytes = content.len(), "artifact found");
                Some(EnrichedResult::from_candidate(candidate, content))
            }
            ArtifactResult::NotFound => {
                tracing::debug!(repo = %repo, "artifact absent");
                None
            }
            ArtifactResult::TransientError(cause) => {
                tracing::warn!(
                    repo = %repo,
                    error = %cause,
                    "artifact fetch failed, skipping candidate"
                );
                None
            }
            ArtifactResult::FatalError(cause) => {
                tracing::error!(
                    repo = %repo,
                    error = %cause,
                    "artifact unusable, skipping candidate"
                );
                None
            }
        }
    }
}

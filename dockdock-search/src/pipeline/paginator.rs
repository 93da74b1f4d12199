//! Search pagination: fetch a page, enrich it, decide whether to continue.
//!
//! # State machine
//!
//! ```text
//!            ┌──────────────────────── next page ───────────────────────┐
//!            ▼                                                          │
//! ┌──────────┐  candidates  ┌───────────┐  appended  ┌──────────┐  short │
//! │ Fetching ├─────────────►│ Enriching ├───────────►│ Deciding ├────────┘
//! └────┬─────┘              └───────────┘            └────┬─────┘
//!      │ empty page                                       │ limit reached /
//!      ▼                                                  ▼ window exhausted
//!   ┌──────┐◄─────────────────────────────────────────────┘
//!   │ Done │          upstream error → Err (no partial outcome)
//!   └──────┘
//! ```

use super::aggregator::assemble;
use super::enricher::BoundedEnricher;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::host::CodeHost;
use crate::types::{EnrichedResult, RepositoryCandidate, SearchCriteria, SearchOutcome};

/// GitHub's search API serves at most this many results per query.
pub const SEARCH_RESULT_WINDOW: u64 = 1000;

enum State {
    Fetching,
    Enriching(Vec<RepositoryCandidate>),
    Deciding,
    Done,
}

/// Drives repeated search requests until enough qualifying results exist.
pub struct SearchPaginator<'a, H> {
    host: &'a H,
    enricher: BoundedEnricher<'a, H>,
}

impl<'a, H: CodeHost> SearchPaginator<'a, H> {
    /// Build a paginator over `host` using the limits from `config`.
    pub fn new(host: &'a H, config: &SearchConfig) -> Self {
        Self {
            host,
            enricher: BoundedEnricher::new(host, config),
        }
    }

    /// Run one search to completion.
    ///
    /// Starts at `criteria.page()` and requests pages of `criteria.limit()`
    /// candidates until `criteria.limit()` qualifying results have been
    /// collected, a page comes back empty, or the next page would lie beyond
    /// both the reported total and [`SEARCH_RESULT_WINDOW`].
    ///
    /// # Errors
    ///
    /// Any error from the search request itself. Nothing accumulated so far
    /// is returned in that case.
    pub async fn run(&self, criteria: &SearchCriteria) -> Result<SearchOutcome, SearchError> {
        let limit = criteria.limit() as usize;
        let mut accumulated: Vec<EnrichedResult> = Vec::with_capacity(limit);
        let mut cursor = criteria.page();
        let mut total_match_count: Option<u64> = None;
        let mut state = State::Fetching;

        loop {
            state = match state {
                State::Fetching => {
                    let page = self
                        .host
                        .search_repositories(criteria.keyword(), cursor, criteria.limit())
                        .await
                        .inspect_err(|e| {
                            tracing::warn!(page = cursor, error = %e, "search request failed");
                        })?;
                    let total = *total_match_count.get_or_insert(page.total_count);
                    tracing::debug!(
                        page = cursor,
                        candidates = page.items.len(),
                        total,
                        "search page received"
                    );
                    if page.items.is_empty() {
                        State::Done
                    } else {
                        State::Enriching(page.items)
                    }
                }
                State::Enriching(candidates) => {
                    let enriched = self.enricher.enrich(candidates).await;
                    let room = limit.saturating_sub(accumulated.len());
                    accumulated.extend(enriched.into_iter().take(room));
                    State::Deciding
                }
                State::Deciding => {
                    let total = total_match_count.unwrap_or(0);
                    if accumulated.len() >= limit
                        || !has_next_page(cursor, criteria.limit(), total)
                    {
                        State::Done
                    } else {
                        cursor += 1;
                        State::Fetching
                    }
                }
                State::Done => {
                    return Ok(assemble(
                        accumulated,
                        criteria,
                        total_match_count.unwrap_or(0),
                    ));
                }
            };
        }
    }
}

/// Whether a page after `cursor` can hold any results.
///
/// The next page starts at zero-based index `cursor * per_page`; it is only
/// worth requesting if that index is below both the reported total and the
/// upstream result window.
pub fn has_next_page(cursor: u32, per_page: u32, total_count: u64) -> bool {
    let next_start = u64::from(cursor) * u64::from(per_page);
    next_start < total_count.min(SEARCH_RESULT_WINDOW)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_page_within_total() {
        assert!(has_next_page(1, 10, 25));
        assert!(has_next_page(2, 10, 25));
        assert!(!has_next_page(3, 10, 25));
    }

    #[test]
    fn no_next_page_when_total_is_exact_multiple() {
        assert!(!has_next_page(2, 10, 20));
    }

    #[test]
    fn window_caps_huge_totals() {
        assert!(has_next_page(9, 100, 2_000_000));
        assert!(!has_next_page(10, 100, 2_000_000));
    }

    #[test]
    fn zero_total_has_no_next_page() {
        assert!(!has_next_page(1, 5, 0));
    }
}

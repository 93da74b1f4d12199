//! Final outcome assembly.

use crate::types::{EnrichedResult, SearchCriteria, SearchOutcome};

/// Build the [`SearchOutcome`] for `criteria`.
///
/// Truncates `accumulated` to the requested limit, keeps its order, and
/// stamps the echoed page, limit and keyword. `total_match_count` is
/// passed through untouched.
pub fn assemble(
    mut accumulated: Vec<EnrichedResult>,
    criteria: &SearchCriteria,
    total_match_count: u64,
) -> SearchOutcome {
    accumulated.truncate(criteria.limit() as usize);
    SearchOutcome {
        results: accumulated,
        total_match_count,
        page: criteria.page(),
        limit: criteria.limit(),
        query: criteria.keyword().to_owned(),
    }
}

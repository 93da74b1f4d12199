//! Core types: search criteria, candidates, enriched results and outcomes.

use crate::error::SearchError;
use serde::{Deserialize, Serialize};

/// Largest page size the upstream search endpoint accepts.
pub const MAX_LIMIT: u32 = 100;

/// Longest keyword accepted.
pub const MAX_KEYWORD_LEN: usize = 500;

/// Placeholder used when a repository has no description.
pub const NO_DESCRIPTION: &str = "no description";

/// What to search for, which page to start at, and how many results to return.
///
/// Fields are private so a constructed value is always valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    keyword: String,
    page: u32,
    limit: u32,
}

impl SearchCriteria {
    /// Build validated criteria.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] if the keyword is blank or longer
    /// than [`MAX_KEYWORD_LEN`] characters, `page` is 0, or `limit` is
    /// outside `1..=MAX_LIMIT`.
    pub fn new(keyword: impl Into<String>, page: u32, limit: u32) -> Result<Self, SearchError> {
        let keyword = keyword.into();
        if keyword.trim().is_empty() {
            return Err(SearchError::Validation("q must not be empty".into()));
        }
        if keyword.chars().count() > MAX_KEYWORD_LEN {
            return Err(SearchError::Validation(format!(
                "q must be at most {MAX_KEYWORD_LEN} characters"
            )));
        }
        if page == 0 {
            return Err(SearchError::Validation("page must be at least 1".into()));
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(SearchError::Validation(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(Self {
            keyword,
            page,
            limit,
        })
    }

    /// The search keyword, exactly as supplied.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// The first upstream page to request (1-based).
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of results to return; also the upstream page size.
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

/// A repository returned by the keyword search, not yet checked for the artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryCandidate {
    /// `owner/name`.
    pub full_name: String,
    /// Repository description, if the owner set one.
    #[serde(default)]
    pub description: Option<String>,
}

impl RepositoryCandidate {
    /// Convenience constructor.
    pub fn new(full_name: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            full_name: full_name.into(),
            description: description.map(str::to_owned),
        }
    }
}

/// One page of the upstream repository search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    /// Number of repositories matching the keyword across all pages.
    #[serde(default)]
    pub total_count: u64,
    /// The repositories on this page, in upstream rank order.
    #[serde(default)]
    pub items: Vec<RepositoryCandidate>,
}

/// A candidate whose artifact was fetched and decoded.
///
/// Serialized field names are the service's public wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedResult {
    /// Decoded `docker-compose.yml` text.
    #[serde(rename = "dockercompose")]
    pub artifact_content: String,
    /// `owner/name` of the repository the artifact came from.
    #[serde(rename = "create")]
    pub source_identifier: String,
    /// Repository description, or [`NO_DESCRIPTION`].
    pub description: String,
}

impl EnrichedResult {
    /// Pair a candidate with its fetched artifact.
    pub fn from_candidate(candidate: RepositoryCandidate, artifact_content: String) -> Self {
        Self {
            artifact_content,
            source_identifier: candidate.full_name,
            description: candidate
                .description
                .unwrap_or_else(|| NO_DESCRIPTION.to_owned()),
        }
    }
}

/// The result of one search invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Qualifying results in discovery order, never more than `limit`.
    pub results: Vec<EnrichedResult>,
    /// Upstream count of repositories matching the keyword.
    ///
    /// This is **not** the number of repositories that carry the artifact:
    /// it is passed through from the first upstream page and is usually far
    /// larger than `results.len()`. Serialized as `total`.
    #[serde(rename = "total")]
    pub total_match_count: u64,
    /// Echo of the requested page.
    pub page: u32,
    /// Echo of the requested limit.
    pub limit: u32,
    /// Echo of the requested keyword.
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_accepts_valid_values() {
        let criteria = SearchCriteria::new("flask", 1, 10).expect("valid");
        assert_eq!(criteria.keyword(), "flask");
        assert_eq!(criteria.page(), 1);
        assert_eq!(criteria.limit(), 10);
    }

    #[test]
    fn criteria_rejects_blank_keyword() {
        let err = SearchCriteria::new("   ", 1, 10).unwrap_err();
        assert!(matches!(err, SearchError::Validation(_)));
        assert!(err.to_string().contains("q"));
    }

    #[test]
    fn criteria_rejects_overlong_keyword() {
        let keyword = "a".repeat(MAX_KEYWORD_LEN + 1);
        assert!(SearchCriteria::new(keyword, 1, 10).is_err());
        let keyword = "a".repeat(MAX_KEYWORD_LEN);
        assert!(SearchCriteria::new(keyword, 1, 10).is_ok());
    }

    #[test]
    fn criteria_rejects_page_zero() {
        let err = SearchCriteria::new("flask", 0, 10).unwrap_err();
        assert!(err.to_string().contains("page"));
    }

    #[test]
    fn criteria_limit_bounds() {
        assert!(SearchCriteria::new("flask", 1, 0).is_err());
        assert!(SearchCriteria::new("flask", 1, 1).is_ok());
        assert!(SearchCriteria::new("flask", 1, 100).is_ok());
        assert!(SearchCriteria::new("flask", 1, 101).is_err());
    }

    #[test]
    fn search_page_parses_github_shape() {
        let json = r#"{
            "total_count": 42,
            "incomplete_results": false,
            "items": [
                {
                    "full_name": "pallets/flask",
                    "description": "The Python micro framework",
                    "stargazers_count": 1
                },
                {"full_name": "someone/untitled", "description": null}
            ]
        }"#;
        let page: SearchPage = serde_json::from_str(json).expect("parse");
        assert_eq!(page.total_count, 42);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].full_name, "pallets/flask");
        assert!(page.items[1].description.is_none());
    }

    #[test]
    fn search_page_tolerates_missing_items() {
        let page: SearchPage = serde_json::from_str(r#"{"total_count": 0}"#).expect("parse");
        assert!(page.items.is_empty());
    }

    #[test]
    fn enriched_result_falls_back_to_placeholder() {
        let candidate = RepositoryCandidate::new("acme/app", None);
        let result = EnrichedResult::from_candidate(candidate, "services: {}".into());
        assert_eq!(result.description, NO_DESCRIPTION);
        assert_eq!(result.source_identifier, "acme/app");
    }

    #[test]
    fn outcome_serializes_wire_field_names() {
        let outcome = SearchOutcome {
            results: vec![EnrichedResult {
                artifact_content: "version: '3'".into(),
                source_identifier: "acme/app".into(),
                description: "demo".into(),
            }],
            total_match_count: 7,
            page: 1,
            limit: 10,
            query: "acme".into(),
        };
        let value = serde_json::to_value(&outcome).expect("serialize");
        assert_eq!(value["total"], 7);
        assert_eq!(value["results"][0]["dockercompose"], "version: '3'");
        assert_eq!(value["results"][0]["create"], "acme/app");
        assert!(value.get("total_match_count").is_none());
    }
}

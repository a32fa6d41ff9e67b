//! Search response type.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::document::ResultItem;
use crate::search::filter::SearchFilters;
use crate::search::ranking::SortStrategy;

/// The outcome of one search call.
///
/// Serializes with the field names the portal frontend already consumes:
/// `results`, `total`, `page`, `limit`, `query`, `filters`, `sortBy`,
/// `responseTime`, plus `degradedSources` and `cached`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// The requested page of ordered results.
    pub results: Vec<ResultItem>,
    /// Number of results after filtering, before pagination.
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    /// The normalized query.
    pub query: String,
    pub filters: SearchFilters,
    #[serde(rename = "sortBy")]
    pub sort_by: SortStrategy,
    /// Wall time spent serving this call, in milliseconds.
    #[serde(rename = "responseTime")]
    pub response_time_ms: f64,
    /// Sources that failed or timed out. Empty on full success.
    #[serde(default)]
    pub degraded_sources: BTreeSet<String>,
    /// Whether this response was served from the result cache.
    #[serde(default)]
    pub cached: bool,
}

impl SearchResponse {
    /// An empty response, used when the query is too short to run.
    pub fn empty(
        query: impl Into<String>,
        filters: SearchFilters,
        sort_by: SortStrategy,
        page: usize,
        limit: usize,
    ) -> Self {
        Self {
            results: Vec::new(),
            total: 0,
            page,
            limit,
            query: query.into(),
            filters,
            sort_by,
            response_time_ms: 0.0,
            degraded_sources: BTreeSet::new(),
            cached: false,
        }
    }

    /// Whether some sources did not contribute.
    pub fn is_partial(&self) -> bool {
        !self.degraded_sources.is_empty()
    }

    /// Number of pages at the response's page size.
    pub fn total_pages(&self) -> usize {
        if self.limit == 0 {
            0
        } else {
            self.total.div_ceil(self.limit)
        }
    }

    /// Whether a page after this one exists.
    pub fn has_next_page(&self) -> bool {
        self.page < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let mut response = SearchResponse::empty(
            "political theory",
            SearchFilters::new(),
            SortStrategy::DateDesc,
            1,
            2,
        );
        response.response_time_ms = 12.5;
        response.degraded_sources.insert("users".into());

        let value = serde_json::to_value(&response).unwrap();
        for key in [
            "results",
            "total",
            "page",
            "limit",
            "query",
            "filters",
            "sortBy",
            "responseTime",
            "degradedSources",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["sortBy"], "date_desc");
        assert_eq!(value["degradedSources"][0], "users");
    }

    #[test]
    fn test_page_math() {
        let mut response =
            SearchResponse::empty("q", SearchFilters::new(), SortStrategy::Relevance, 2, 3);
        response.total = 7;
        assert_eq!(response.total_pages(), 3);
        assert!(response.has_next_page());

        response.page = 3;
        assert!(!response.has_next_page());
    }
}

//! Request/response types and the pure result-set transformations:
//! filtering, ranking and pagination.

pub mod collation;
pub mod filter;
pub mod pagination;
pub mod ranking;
pub mod request;
pub mod response;

pub use self::filter::{FilterEngine, FilterValue, SearchFilters};
pub use self::pagination::{Page, paginate};
pub use self::ranking::{RankingEngine, SortStrategy};
pub use self::request::{SearchParams, SearchRequest};
pub use self::response::SearchResponse;

use serde::{Deserialize, Serialize};

use crate::query::normalizer::DEFAULT_MAX_QUERY_LENGTH;

/// Configuration for request validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum normalized query length, in grapheme clusters.
    pub max_query_length: usize,
    /// Queries shorter than this short-circuit to an empty response.
    pub min_query_length: usize,
    /// Page size used when a request asks for zero results per page.
    pub default_limit: usize,
    /// Upper bound on the page size.
    pub max_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
            min_query_length: 2,
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl SearchConfig {
    /// Set the maximum page size.
    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = max_limit;
        self
    }

    /// Set the minimum query length.
    pub fn with_min_query_length(mut self, min_query_length: usize) -> Self {
        self.min_query_length = min_query_length;
        self
    }

    /// Clamp a requested page size into `1..=max_limit`.
    pub fn effective_limit(&self, requested: usize) -> usize {
        let limit = if requested == 0 {
            self.default_limit
        } else {
            requested
        };
        limit.clamp(1, self.max_limit.max(1))
    }
}

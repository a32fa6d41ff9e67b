//! Search request types.

use serde::{Deserialize, Serialize};

use crate::query::normalizer::QueryNormalizer;
use crate::search::SearchConfig;
use crate::search::filter::SearchFilters;
use crate::search::ranking::SortStrategy;

/// Caller-supplied search parameters, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchParams {
    /// Free-text query as typed.
    pub query: String,
    /// Structured filters.
    pub filters: SearchFilters,
    /// Result ordering.
    #[serde(rename = "sortBy")]
    pub sort: SortStrategy,
    /// 1-based page number.
    pub page: usize,
    /// Page size.
    pub limit: usize,
}

impl SearchParams {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            page: 1,
            ..Default::default()
        }
    }

    pub fn filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn sort(mut self, sort: SortStrategy) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A validated, immutable search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    raw_query: String,
    normalized_query: String,
    filters: SearchFilters,
    sort: SortStrategy,
    page: usize,
    limit: usize,
}

impl SearchRequest {
    /// Normalize the query text and clamp pagination.
    pub fn prepare(params: SearchParams, normalizer: &QueryNormalizer, config: &SearchConfig) -> Self {
        let normalized_query = normalizer.normalize(&params.query);
        Self {
            raw_query: params.query,
            normalized_query,
            filters: params.filters,
            sort: params.sort,
            page: params.page.max(1),
            limit: config.effective_limit(params.limit),
        }
    }

    pub fn raw_query(&self) -> &str {
        &self.raw_query
    }

    pub fn normalized_query(&self) -> &str {
        &self.normalized_query
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn sort(&self) -> SortStrategy {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether the normalized query is too short to be worth running.
    pub fn is_too_short(&self, min_length: usize) -> bool {
        QueryNormalizer::length(&self.normalized_query) < min_length
    }
}

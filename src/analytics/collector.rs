//! Search analytics collector.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::analytics::config::AnalyticsConfig;
use crate::analytics::history::{HistoryEntry, SearchHistory};
use crate::federation::stats::SourceStats;
use crate::query::normalizer::{QueryNormalizer, tokenize};
use crate::search::filter::SearchFilters;
use crate::util::clock::SharedClock;

/// Number of terms reported in an [`AnalyticsSnapshot`].
pub const SNAPSHOT_TOP_TERMS: usize = 10;

/// A popular term and how often it was searched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: u64,
}

/// Point-in-time view of the analytics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_searches: u64,
    pub average_response_time_ms: f64,
    pub top_terms: Vec<TermCount>,
    pub history_len: usize,
    /// Per-source statistics, filled in by the orchestrator.
    pub sources: Vec<SourceStats>,
}

#[derive(Debug)]
struct TermStat {
    count: u64,
    first_seen: u64,
}

#[derive(Debug)]
struct AnalyticsState {
    total_searches: u64,
    average_response_time_ms: f64,
    terms: HashMap<String, TermStat>,
    next_term_seq: u64,
    history: SearchHistory,
}

impl AnalyticsState {
    fn new(capacity: usize) -> Self {
        Self {
            total_searches: 0,
            average_response_time_ms: 0.0,
            terms: HashMap::new(),
            next_term_seq: 0,
            history: SearchHistory::new(capacity),
        }
    }
}

/// Thread-safe recorder of search activity.
#[derive(Debug)]
pub struct SearchAnalytics {
    config: AnalyticsConfig,
    clock: SharedClock,
    state: RwLock<AnalyticsState>,
}

impl SearchAnalytics {
    pub fn new(config: AnalyticsConfig, clock: SharedClock) -> Self {
        let state = RwLock::new(AnalyticsState::new(config.history_capacity));
        Self {
            config,
            clock,
            state,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Record one completed search.
    ///
    /// Counts every whitespace token at least `min_term_length` characters
    /// long, folds the response time into the running mean, and prepends a
    /// history entry.
    pub fn record(&self, normalized_query: &str, filters: &SearchFilters, response_time_ms: f64) {
        if !self.config.enabled {
            return;
        }

        let timestamp = self.clock.now();
        let mut state = self.state.write();

        state.total_searches += 1;
        let count = state.total_searches as f64;
        state.average_response_time_ms += (response_time_ms - state.average_response_time_ms) / count;

        for token in tokenize(normalized_query) {
            if QueryNormalizer::length(token) < self.config.min_term_length {
                continue;
            }
            let seq = state.next_term_seq;
            let stat = state.terms.entry(token.to_string()).or_insert(TermStat {
                count: 0,
                first_seen: seq,
            });
            stat.count += 1;
            if stat.first_seen == seq {
                state.next_term_seq += 1;
            }
        }

        state.history.push(HistoryEntry {
            query: normalized_query.to_string(),
            filters: filters.clone(),
            timestamp,
        });

        log::trace!(
            "recorded search '{normalized_query}' ({response_time_ms:.2} ms), total {}",
            state.total_searches
        );
    }

    /// The `n` most frequent terms. Equal counts keep first-seen order.
    pub fn get_top_terms(&self, n: usize) -> Vec<TermCount> {
        let state = self.state.read();
        let mut terms: Vec<_> = state.terms.iter().collect();
        terms.sort_by(|(_, a), (_, b)| b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen)));
        terms
            .into_iter()
            .take(n)
            .map(|(term, stat)| TermCount {
                term: term.clone(),
                count: stat.count,
            })
            .collect()
    }

    pub fn total_searches(&self) -> u64 {
        self.state.read().total_searches
    }

    pub fn average_response_time_ms(&self) -> f64 {
        self.state.read().average_response_time_ms
    }

    /// Recent searches, newest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state.read().history.entries()
    }

    /// Empty the history. Counters and terms are kept.
    pub fn clear_history(&self) {
        self.state.write().history.clear();
    }

    /// Forget everything recorded so far.
    pub fn reset(&self) {
        *self.state.write() = AnalyticsState::new(self.config.history_capacity);
    }

    pub fn snapshot(&self) -> AnalyticsSnapshot {
        let top_terms = self.get_top_terms(SNAPSHOT_TOP_TERMS);
        let state = self.state.read();
        AnalyticsSnapshot {
            total_searches: state.total_searches,
            average_response_time_ms: state.average_response_time_ms,
            top_terms,
            history_len: state.history.len(),
            sources: Vec::new(),
        }
    }
}

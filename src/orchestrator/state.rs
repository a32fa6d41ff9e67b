//! Stages of a search call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage a search call is in.
///
/// A call moves through the stages in declaration order, except that a
/// too-short query jumps from `Validating` to `ShortCircuitEmpty`, a cache
/// hit jumps from `CacheLookup` to `CacheHit`, and total source failure ends
/// in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    Validating,
    ShortCircuitEmpty,
    CacheLookup,
    CacheHit,
    Federating,
    Filtering,
    Ranking,
    Paginating,
    Caching,
    RecordingAnalytics,
    Done,
    Failed,
}

impl SearchState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchState::Validating => "validating",
            SearchState::ShortCircuitEmpty => "short_circuit_empty",
            SearchState::CacheLookup => "cache_lookup",
            SearchState::CacheHit => "cache_hit",
            SearchState::Federating => "federating",
            SearchState::Filtering => "filtering",
            SearchState::Ranking => "ranking",
            SearchState::Paginating => "paginating",
            SearchState::Caching => "caching",
            SearchState::RecordingAnalytics => "recording_analytics",
            SearchState::Done => "done",
            SearchState::Failed => "failed",
        }
    }

    /// Whether the call has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchState::Done | SearchState::Failed)
    }
}

impl fmt::Display for SearchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

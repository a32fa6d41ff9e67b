//! Bounded, most-recent-first search history.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::search::filter::SearchFilters;

/// One recorded search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The normalized query.
    pub query: String,
    pub filters: SearchFilters,
    pub timestamp: DateTime<Utc>,
}

/// Fixed-capacity history. The newest entry is first; the oldest falls off
/// once capacity is reached.
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl SearchHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

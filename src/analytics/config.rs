//! Configuration for search analytics.

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::analytics::SearchAnalytics`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Whether searches are recorded. When false, recording is a no-op.
    pub enabled: bool,

    /// Number of recent searches kept in the history.
    pub history_capacity: usize,

    /// Minimum length, in characters, of a query token counted as a term.
    pub min_term_length: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            history_capacity: 100,
            min_term_length: 3,
        }
    }
}

impl AnalyticsConfig {
    /// A configuration that records nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn with_min_term_length(mut self, length: usize) -> Self {
        self.min_term_length = length;
        self
    }
}

//! Per-source health statistics.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::federation::task::SourceOutcome;

/// Statistics for one content source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceStats {
    /// Source identifier.
    pub source_id: String,

    /// Number of calls issued to this source.
    pub calls: u64,

    /// Number of calls that returned items.
    pub successes: u64,

    /// Number of calls that errored or were cancelled.
    pub failures: u64,

    /// Number of calls that ran out of time.
    pub timeouts: u64,

    /// Running mean of call latency in milliseconds.
    pub avg_response_time_ms: f64,

    /// Total items returned by this source.
    pub items_returned: u64,
}

impl SourceStats {
    fn new(source_id: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            ..Default::default()
        }
    }

    /// Fraction of calls that succeeded, or `None` before the first call.
    pub fn success_rate(&self) -> Option<f64> {
        (self.calls > 0).then(|| self.successes as f64 / self.calls as f64)
    }
}

/// Thread-safe collector of [`SourceStats`].
#[derive(Debug, Default)]
pub struct SourceStatsCollector {
    stats: Mutex<HashMap<String, SourceStats>>,
}

impl SourceStatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one source call.
    pub fn record(&self, outcome: &SourceOutcome) {
        let mut stats = self.stats.lock();
        let entry = stats
            .entry(outcome.source_id.clone())
            .or_insert_with(|| SourceStats::new(&outcome.source_id));

        entry.calls += 1;
        if outcome.is_success() {
            entry.successes += 1;
            entry.items_returned += outcome.hit_count() as u64;
        } else if outcome.timed_out {
            entry.timeouts += 1;
        } else {
            entry.failures += 1;
        }

        let sample = outcome.execution_time.as_secs_f64() * 1000.0;
        entry.avg_response_time_ms += (sample - entry.avg_response_time_ms) / entry.calls as f64;
    }

    /// Statistics for one source.
    pub fn get(&self, source_id: &str) -> Option<SourceStats> {
        self.stats.lock().get(source_id).cloned()
    }

    /// Statistics for every source seen so far, ordered by identifier.
    pub fn snapshot(&self) -> Vec<SourceStats> {
        let mut all: Vec<_> = self.stats.lock().values().cloned().collect();
        all.sort_by(|a, b| a.source_id.cmp(&b.source_id));
        all
    }

    /// Forget a source's statistics.
    pub fn remove(&self, source_id: &str) {
        self.stats.lock().remove(source_id);
    }

    /// Reset all statistics.
    pub fn reset(&self) {
        self.stats.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FedSearchError;
    use crate::federation::task::SourceTask;
    use std::time::Duration;

    #[test]
    fn test_stats_collection() {
        let collector = SourceStatsCollector::new();
        let task = SourceTask::new("articles", "q");

        collector.record(&SourceOutcome::success(&task, vec![], Duration::from_millis(100)));
        collector.record(&SourceOutcome::failure(
            &task,
            FedSearchError::source_failure("articles", "boom"),
            Duration::from_millis(200),
        ));
        collector.record(&SourceOutcome::timeout(&task, Duration::from_millis(300)));

        let stats = collector.get("articles").unwrap();
        assert_eq!(stats.calls, 3);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.timeouts, 1);
        assert!((stats.avg_response_time_ms - 200.0).abs() < 1e-9);
        assert!((stats.success_rate().unwrap() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_sorted_and_reset() {
        let collector = SourceStatsCollector::new();
        for id in ["users", "articles"] {
            let task = SourceTask::new(id, "q");
            collector.record(&SourceOutcome::success(&task, vec![], Duration::ZERO));
        }

        let ids: Vec<_> = collector.snapshot().into_iter().map(|s| s.source_id).collect();
        assert_eq!(ids, vec!["articles", "users"]);

        collector.reset();
        assert!(collector.snapshot().is_empty());
    }
}

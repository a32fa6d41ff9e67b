//! Per-source task definitions for federated execution.

use std::time::Duration;

use crate::document::ResultItem;
use crate::error::FedSearchError;

/// A query to be executed against one source.
#[derive(Debug, Clone)]
pub struct SourceTask {
    /// Unique identifier for this task.
    pub task_id: String,

    /// Source this task targets.
    pub source_id: String,

    /// Normalized query text.
    pub query: String,

    /// Budget for this task, if tighter than the shared deadline.
    pub timeout: Option<Duration>,
}

impl SourceTask {
    /// Create a new task for `source_id`.
    pub fn new(source_id: impl Into<String>, query: impl Into<String>) -> Self {
        let source_id = source_id.into();
        let task_id = format!("{}_{}", source_id, uuid::Uuid::new_v4());
        Self {
            task_id,
            source_id,
            query: query.into(),
            timeout: None,
        }
    }

    /// Set the timeout for this task.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Result of executing one source task.
#[derive(Debug)]
pub struct SourceOutcome {
    /// Task this outcome belongs to.
    pub task_id: String,

    /// Source that produced it.
    pub source_id: String,

    /// Items if the source answered.
    pub items: Option<Vec<ResultItem>>,

    /// Error if the source failed, timed out or was cancelled.
    pub error: Option<FedSearchError>,

    /// Time spent waiting on the source.
    pub execution_time: Duration,

    /// Whether the source ran out of time.
    pub timed_out: bool,
}

impl SourceOutcome {
    /// Create a successful outcome.
    pub fn success(task: &SourceTask, items: Vec<ResultItem>, execution_time: Duration) -> Self {
        Self {
            task_id: task.task_id.clone(),
            source_id: task.source_id.clone(),
            items: Some(items),
            error: None,
            execution_time,
            timed_out: false,
        }
    }

    /// Create a failed outcome.
    pub fn failure(task: &SourceTask, error: FedSearchError, execution_time: Duration) -> Self {
        Self {
            task_id: task.task_id.clone(),
            source_id: task.source_id.clone(),
            items: None,
            error: Some(error),
            execution_time,
            timed_out: false,
        }
    }

    /// Create a timed-out outcome.
    pub fn timeout(task: &SourceTask, execution_time: Duration) -> Self {
        Self {
            timed_out: true,
            ..Self::failure(
                task,
                FedSearchError::timeout(format!("source '{}' did not answer in time", task.source_id)),
                execution_time,
            )
        }
    }

    /// Create a cancelled outcome.
    pub fn cancelled(task: &SourceTask, execution_time: Duration) -> Self {
        Self::failure(
            task,
            FedSearchError::cancelled(format!("call to source '{}' was cancelled", task.source_id)),
            execution_time,
        )
    }

    /// Check if the source answered.
    pub fn is_success(&self) -> bool {
        self.items.is_some() && self.error.is_none()
    }

    /// Number of items returned.
    pub fn hit_count(&self) -> usize {
        self.items.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// One-line diagnostic for a failed outcome.
    pub fn describe_failure(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| format!("{}: {}", self.source_id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_ids_are_unique_per_source() {
        let a = SourceTask::new("articles", "q");
        let b = SourceTask::new("articles", "q");
        assert!(a.task_id.starts_with("articles_"));
        assert_ne!(a.task_id, b.task_id);
    }

    #[test]
    fn test_outcome_constructors() {
        let task = SourceTask::new("users", "q").with_timeout(Some(Duration::from_millis(10)));

        let ok = SourceOutcome::success(&task, vec![], Duration::from_millis(3));
        assert!(ok.is_success());
        assert_eq!(ok.hit_count(), 0);
        assert!(ok.describe_failure().is_none());

        let timed_out = SourceOutcome::timeout(&task, Duration::from_millis(10));
        assert!(!timed_out.is_success());
        assert!(timed_out.timed_out);
        assert!(
            timed_out
                .describe_failure()
                .unwrap()
                .starts_with("users: Timeout")
        );

        let cancelled = SourceOutcome::cancelled(&task, Duration::ZERO);
        assert!(!cancelled.timed_out);
        assert!(matches!(cancelled.error, Some(FedSearchError::Cancelled(_))));
    }
}

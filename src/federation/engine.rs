//! Main federation engine implementation.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::document::ResultItem;
use crate::error::{FedSearchError, Result};
use crate::federation::config::FederationConfig;
use crate::federation::context::SearchContext;
use crate::federation::source::{ContentSource, SourceParams, SourceRegistry};
use crate::federation::stats::{SourceStats, SourceStatsCollector};
use crate::federation::task::{SourceOutcome, SourceTask};
use crate::search::filter::SearchFilters;

/// Merged output of one federated call.
#[derive(Debug, Clone, Default)]
pub struct Federation {
    /// Items from every source that answered, tagged with their source id.
    /// Order is unspecified.
    pub items: Vec<ResultItem>,

    /// Sources that failed, timed out or were cancelled.
    pub degraded: BTreeSet<String>,

    /// One diagnostic line per degraded source.
    pub failures: Vec<String>,

    /// Number of sources the query was issued to.
    pub attempted: usize,

    /// Wall time of the fan-out.
    pub elapsed: Duration,
}

/// Issues a query to every registered source concurrently.
#[derive(Debug)]
pub struct SourceFederator {
    /// Configuration for the federator.
    config: FederationConfig,

    /// Registered sources.
    registry: SourceRegistry,

    /// Per-source statistics.
    stats: SourceStatsCollector,
}

impl SourceFederator {
    /// Create a new federator with no sources.
    pub fn new(config: FederationConfig) -> Self {
        Self {
            config,
            registry: SourceRegistry::new(),
            stats: SourceStatsCollector::new(),
        }
    }

    pub fn config(&self) -> &FederationConfig {
        &self.config
    }

    /// Register a content source.
    pub fn register_source(&self, source: Arc<dyn ContentSource>) -> Result<()> {
        self.registry.register(source)
    }

    /// Remove a content source and its statistics.
    pub fn unregister_source(&self, id: &str) -> Option<Arc<dyn ContentSource>> {
        self.stats.remove(id);
        self.registry.unregister(id)
    }

    /// Enable or disable a source.
    pub fn set_source_active(&self, id: &str, active: bool) -> Result<()> {
        self.registry.set_active(id, active)
    }

    /// Identifiers of all registered sources.
    pub fn source_ids(&self) -> Vec<String> {
        self.registry.ids()
    }

    /// Get the number of registered sources.
    pub fn source_count(&self) -> usize {
        self.registry.len()
    }

    /// Per-source statistics snapshot.
    pub fn source_stats(&self) -> Vec<SourceStats> {
        self.stats.snapshot()
    }

    /// Reset per-source statistics.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Query every active source and merge whatever succeeds.
    pub async fn federate(
        &self,
        ctx: &SearchContext,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Federation> {
        self.federate_with(ctx, query, filters, |_| {}).await
    }

    /// Like [`federate`](Self::federate), calling `on_outcome` as each source
    /// finishes.
    ///
    /// Fails with [`FedSearchError::SourcesUnavailable`] only when no source
    /// answered, including when no source is registered at all.
    pub async fn federate_with<F>(
        &self,
        ctx: &SearchContext,
        query: &str,
        filters: &SearchFilters,
        mut on_outcome: F,
    ) -> Result<Federation>
    where
        F: FnMut(&SourceOutcome),
    {
        let started = Instant::now();

        let sources = self.registry.active();
        if sources.is_empty() {
            log::error!("no active content sources to search");
            return Err(FedSearchError::sources_unavailable(0, Vec::new()));
        }

        let deadline = ctx.resolve_deadline(self.config.default_timeout);
        let params = Arc::new(SourceParams {
            filters: filters.clone(),
            max_results: self.config.max_results_per_source,
        });

        // Tasks left running when this future finishes or is dropped are
        // cancelled through the guard.
        let cancel = ctx.token().child_token();
        let _guard = cancel.clone().drop_guard();

        let mut pending: FuturesUnordered<_> = sources
            .into_iter()
            .map(|handle| {
                let task = SourceTask::new(handle.id, query)
                    .with_timeout(self.config.per_source_timeout);
                let fallback = task.clone();
                let spawned = tokio::spawn(Self::execute_single_task(
                    task,
                    handle.source,
                    Arc::clone(&params),
                    deadline,
                    cancel.clone(),
                ));

                spawned.map(move |joined| match joined {
                    Ok(outcome) => outcome,
                    Err(e) => SourceOutcome::failure(
                        &fallback,
                        FedSearchError::source_failure(
                            &fallback.source_id,
                            format!("source task aborted: {e}"),
                        ),
                        Duration::ZERO,
                    ),
                })
            })
            .collect();

        let attempted = pending.len();
        let mut federation = Federation {
            attempted,
            ..Default::default()
        };
        let mut seen = HashSet::new();

        while let Some(mut outcome) = pending.next().await {
            self.stats.record(&outcome);
            on_outcome(&outcome);

            match outcome.items.take() {
                Some(items) if outcome.error.is_none() => {
                    log::debug!(
                        "source '{}' (task {}) returned {} items in {:?}",
                        outcome.source_id,
                        outcome.task_id,
                        items.len(),
                        outcome.execution_time
                    );
                    for mut item in items.into_iter().take(self.config.max_results_per_source) {
                        item.source_id.clone_from(&outcome.source_id);
                        let (source_id, id) = item.dedup_key();
                        if seen.insert((source_id.to_owned(), id.to_owned())) {
                            federation.items.push(item);
                        }
                    }
                }
                _ => {
                    let reason = outcome
                        .describe_failure()
                        .unwrap_or_else(|| format!("{}: no result", outcome.source_id));
                    log::warn!("degraded source {reason} (task {})", outcome.task_id);
                    federation.degraded.insert(outcome.source_id.clone());
                    federation.failures.push(reason);
                }
            }
        }

        federation.elapsed = started.elapsed();

        if federation.degraded.len() == attempted {
            log::error!("all {attempted} content sources failed");
            return Err(FedSearchError::sources_unavailable(
                attempted,
                federation.failures,
            ));
        }

        Ok(federation)
    }

    /// Execute a single source task, bounded by the deadline and token.
    async fn execute_single_task(
        task: SourceTask,
        source: Arc<dyn ContentSource>,
        params: Arc<SourceParams>,
        deadline: Instant,
        cancel: CancellationToken,
    ) -> SourceOutcome {
        let started = Instant::now();
        let task_deadline = task
            .timeout
            .and_then(|timeout| started.checked_add(timeout))
            .map_or(deadline, |limit| deadline.min(limit));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => SourceOutcome::cancelled(&task, started.elapsed()),
            result = tokio::time::timeout_at(task_deadline, source.search(&task.query, &params)) => {
                match result {
                    Ok(Ok(items)) => SourceOutcome::success(&task, items, started.elapsed()),
                    Ok(Err(e)) => SourceOutcome::failure(&task, e, started.elapsed()),
                    Err(_) => SourceOutcome::timeout(&task, started.elapsed()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    enum Behavior {
        Items(Vec<&'static str>),
        Fail,
        Sleep(Duration),
        Panic,
    }

    #[derive(Debug)]
    struct ScriptedSource {
        id: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(id: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                id,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ContentSource for ScriptedSource {
        fn id(&self) -> &str {
            self.id
        }

        async fn search(&self, _query: &str, _params: &SourceParams) -> Result<Vec<ResultItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Items(ids) => Ok(ids
                    .iter()
                    .map(|id| ResultItem::builder(*id, format!("title {id}")).build())
                    .collect()),
                Behavior::Fail => Err(FedSearchError::source_failure(self.id, "backend down")),
                Behavior::Sleep(d) => {
                    tokio::time::sleep(*d).await;
                    Ok(vec![ResultItem::builder("late", "late").build()])
                }
                Behavior::Panic => panic!("scripted panic"),
            }
        }
    }

    fn federator(sources: Vec<Arc<ScriptedSource>>) -> SourceFederator {
        let federator = SourceFederator::new(FederationConfig::default());
        for source in sources {
            federator.register_source(source).unwrap();
        }
        federator
    }

    fn sorted_ids(federation: &Federation) -> Vec<(String, String)> {
        let mut ids: Vec<_> = federation
            .items
            .iter()
            .map(|i| (i.source_id.clone(), i.id.clone()))
            .collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_merges_and_tags_items() {
        let federator = federator(vec![
            ScriptedSource::new("articles", Behavior::Items(vec!["1", "2"])),
            ScriptedSource::new("news", Behavior::Items(vec!["1"])),
        ]);

        let federation = federator
            .federate(&SearchContext::new(), "query", &SearchFilters::new())
            .await
            .unwrap();

        assert_eq!(federation.attempted, 2);
        assert!(federation.degraded.is_empty());
        assert_eq!(sorted_ids(&federation), vec![
            ("articles".to_string(), "1".to_string()),
            ("articles".to_string(), "2".to_string()),
            ("news".to_string(), "1".to_string()),
        ]);
    }

    #[tokio::test]
    async fn test_duplicate_items_within_source_collapse() {
        let federator = federator(vec![ScriptedSource::new(
            "articles",
            Behavior::Items(vec!["1", "1", "2"]),
        )]);

        let federation = federator
            .federate(&SearchContext::new(), "query", &SearchFilters::new())
            .await
            .unwrap();
        assert_eq!(federation.items.len(), 2);
    }

    #[tokio::test]
    async fn test_partial_failure_is_degraded() {
        let federator = federator(vec![
            ScriptedSource::new("articles", Behavior::Items(vec!["1"])),
            ScriptedSource::new("users", Behavior::Fail),
            ScriptedSource::new("categories", Behavior::Panic),
        ]);

        let mut seen = Vec::new();
        let federation = federator
            .federate_with(&SearchContext::new(), "query", &SearchFilters::new(), |o| {
                seen.push(o.source_id.clone())
            })
            .await
            .unwrap();

        assert_eq!(federation.items.len(), 1);
        assert_eq!(
            federation.degraded.iter().cloned().collect::<Vec<_>>(),
            vec!["categories", "users"]
        );
        assert_eq!(federation.failures.len(), 2);
        seen.sort();
        assert_eq!(seen, vec!["articles", "categories", "users"]);
    }

    #[tokio::test]
    async fn test_total_failure_is_an_error() {
        let federator = federator(vec![
            ScriptedSource::new("a", Behavior::Fail),
            ScriptedSource::new("b", Behavior::Fail),
        ]);

        let err = federator
            .federate(&SearchContext::new(), "query", &SearchFilters::new())
            .await
            .unwrap_err();
        match err {
            FedSearchError::SourcesUnavailable { attempted, failures } => {
                assert_eq!(attempted, 2);
                assert_eq!(failures.len(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_no_sources_is_unavailable() {
        let federator = federator(vec![]);
        let result = federator
            .federate(&SearchContext::new(), "query", &SearchFilters::new())
            .await;
        assert!(matches!(
            result,
            Err(FedSearchError::SourcesUnavailable { attempted: 0, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out_at_deadline() {
        let federator = federator(vec![
            ScriptedSource::new("fast", Behavior::Items(vec!["1"])),
            ScriptedSource::new("slow", Behavior::Sleep(Duration::from_secs(60))),
        ]);

        let ctx = SearchContext::with_timeout(Duration::from_millis(500));
        let started = Instant::now();
        let federation = federator
            .federate(&ctx, "query", &SearchFilters::new())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(federation.items.len(), 1);
        assert!(federation.degraded.contains("slow"));

        let stats = federator
            .source_stats()
            .into_iter()
            .find(|s| s.source_id == "slow")
            .unwrap();
        assert_eq!(stats.timeouts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_per_source_timeout() {
        let federator = SourceFederator::new(
            FederationConfig::default().with_per_source_timeout(Duration::from_millis(100)),
        );
        federator
            .register_source(ScriptedSource::new("fast", Behavior::Items(vec!["1"])))
            .unwrap();
        federator
            .register_source(ScriptedSource::new(
                "slow",
                Behavior::Sleep(Duration::from_millis(200)),
            ))
            .unwrap();

        let federation = federator
            .federate(&SearchContext::new(), "query", &SearchFilters::new())
            .await
            .unwrap();
        assert!(federation.degraded.contains("slow"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_per_source_timeout() {
        let federator = SourceFederator::new(
            FederationConfig::default().with_per_source_timeout(Duration::MAX),
        );
        federator
            .register_source(ScriptedSource::new("articles", Behavior::Items(vec!["1"])))
            .unwrap();
        federator
            .register_source(ScriptedSource::new(
                "slow",
                Behavior::Sleep(Duration::from_secs(60)),
            ))
            .unwrap();

        let ctx = SearchContext::with_timeout(Duration::from_millis(500));
        let federation = federator
            .federate(&ctx, "query", &SearchFilters::new())
            .await
            .unwrap();
        assert_eq!(federation.items.len(), 1);
        assert_eq!(
            federation.degraded.iter().cloned().collect::<Vec<_>>(),
            vec!["slow"]
        );
        assert!(federation.failures[0].contains("Timeout"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_source_timing_out_fails_the_call() {
        let federator = federator(vec![ScriptedSource::new(
            "slow",
            Behavior::Sleep(Duration::from_secs(10)),
        )]);
        let ctx = SearchContext::with_timeout(Duration::from_millis(50));

        let result = federator.federate(&ctx, "query", &SearchFilters::new()).await;
        assert!(matches!(result, Err(FedSearchError::SourcesUnavailable { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_abandons_outstanding_calls() {
        let federator = federator(vec![
            ScriptedSource::new("slow-a", Behavior::Sleep(Duration::from_secs(10))),
            ScriptedSource::new("slow-b", Behavior::Sleep(Duration::from_secs(10))),
        ]);
        let ctx = SearchContext::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let result = federator.federate(&ctx, "query", &SearchFilters::new()).await;
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(matches!(result, Err(FedSearchError::SourcesUnavailable { attempted: 2, .. })));
    }

    #[tokio::test]
    async fn test_inactive_source_not_called() {
        let idle = ScriptedSource::new("idle", Behavior::Items(vec!["x"]));
        let federator = federator(vec![
            ScriptedSource::new("articles", Behavior::Items(vec!["1"])),
            Arc::clone(&idle),
        ]);
        federator.set_source_active("idle", false).unwrap();

        let federation = federator
            .federate(&SearchContext::new(), "query", &SearchFilters::new())
            .await
            .unwrap();
        assert_eq!(federation.attempted, 1);
        assert_eq!(idle.calls.load(Ordering::SeqCst), 0);
    }
}

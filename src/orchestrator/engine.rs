//! The search orchestrator.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::Instant;

use crate::analytics::collector::{AnalyticsSnapshot, SearchAnalytics, TermCount};
use crate::analytics::history::HistoryEntry;
use crate::cache::fingerprint::Fingerprint;
use crate::cache::result_cache::{CacheStats, ResultCache};
use crate::cache::sweeper::{CacheSweeper, SweeperHandle};
use crate::error::Result;
use crate::federation::context::SearchContext;
use crate::federation::engine::SourceFederator;
use crate::federation::source::ContentSource;
use crate::federation::task::SourceOutcome;
use crate::orchestrator::config::EngineConfig;
use crate::orchestrator::events::{EventSink, SearchEvent};
use crate::orchestrator::state::SearchState;
use crate::query::normalizer::QueryNormalizer;
use crate::search::filter::FilterEngine;
use crate::search::pagination::paginate;
use crate::search::ranking::RankingEngine;
use crate::search::request::{SearchParams, SearchRequest};
use crate::search::response::SearchResponse;
use crate::util::clock::{SharedClock, SystemClock};

/// Entry point for searching across every registered content source.
///
/// A call runs normalization, cache lookup, federation, filtering, ranking
/// and pagination in that order, then caches the response and records it in
/// the analytics. The orchestrator is safe to share between tasks; the cache
/// and the analytics each synchronize internally.
#[derive(Debug)]
pub struct SearchOrchestrator {
    config: EngineConfig,
    normalizer: QueryNormalizer,
    federator: SourceFederator,
    filter: FilterEngine,
    ranking: RankingEngine,
    cache: Arc<ResultCache>,
    analytics: SearchAnalytics,
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl SearchOrchestrator {
    /// Create an orchestrator using the system clock.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an orchestrator reading time from `clock`.
    pub fn with_clock(config: EngineConfig, clock: SharedClock) -> Self {
        Self {
            normalizer: QueryNormalizer::new(config.search.max_query_length),
            federator: SourceFederator::new(config.federation.clone()),
            filter: FilterEngine::new(Arc::clone(&clock)),
            ranking: RankingEngine::new(),
            cache: Arc::new(ResultCache::new(config.cache.clone(), Arc::clone(&clock))),
            analytics: SearchAnalytics::new(config.analytics.clone(), clock),
            sweeper: Mutex::new(None),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a search with the configured default deadline.
    pub async fn search(&self, params: SearchParams) -> Result<SearchResponse> {
        self.search_with_context(params, &SearchContext::new()).await
    }

    /// Run a search bounded by the caller's deadline and cancellation token.
    pub async fn search_with_context(
        &self,
        params: SearchParams,
        ctx: &SearchContext,
    ) -> Result<SearchResponse> {
        self.execute(params, ctx, EventSink::default()).await
    }

    /// Run a search, reporting progress on `events`.
    pub async fn search_with_events(
        &self,
        params: SearchParams,
        ctx: &SearchContext,
        events: UnboundedSender<SearchEvent>,
    ) -> Result<SearchResponse> {
        self.execute(params, ctx, EventSink::new(Some(events))).await
    }

    async fn execute(
        &self,
        params: SearchParams,
        ctx: &SearchContext,
        events: EventSink,
    ) -> Result<SearchResponse> {
        let started = Instant::now();

        events.stage(SearchState::Validating);
        let request = SearchRequest::prepare(params, &self.normalizer, &self.config.search);

        if request.is_too_short(self.config.search.min_query_length) {
            events.stage(SearchState::ShortCircuitEmpty);
            let response = SearchResponse::empty(
                request.normalized_query(),
                request.filters().clone(),
                request.sort(),
                request.page(),
                request.limit(),
            );
            return Ok(Self::finish(&events, response));
        }

        events.stage(SearchState::CacheLookup);
        let key = Fingerprint::of(&request);
        if let Some(mut response) = self.cache.get(&key) {
            events.stage(SearchState::CacheHit);
            response.cached = true;
            response.response_time_ms = elapsed_ms(started);
            log::debug!("served '{}' from cache", request.normalized_query());
            return Ok(Self::finish(&events, response));
        }

        events.stage(SearchState::Federating);
        let federation = self
            .federator
            .federate_with(ctx, request.normalized_query(), request.filters(), |outcome| {
                events.emit(outcome_event(outcome))
            })
            .await;
        let federation = match federation {
            Ok(federation) => federation,
            Err(e) => {
                events.stage(SearchState::Failed);
                log::error!("search for '{}' failed: {e}", request.normalized_query());
                return Err(e);
            }
        };

        events.stage(SearchState::Filtering);
        let filtered = self.filter.apply(federation.items, request.filters());

        events.stage(SearchState::Ranking);
        let ranked = self.ranking.sort_owned(filtered, request.sort());

        events.stage(SearchState::Paginating);
        let page = paginate(ranked, request.page(), request.limit());

        let response = SearchResponse {
            results: page.items,
            total: page.total,
            page: request.page(),
            limit: request.limit(),
            query: request.normalized_query().to_string(),
            filters: request.filters().clone(),
            sort_by: request.sort(),
            response_time_ms: elapsed_ms(started),
            degraded_sources: federation.degraded,
            cached: false,
        };

        events.stage(SearchState::Caching);
        self.cache.store(key, response.clone());

        events.stage(SearchState::RecordingAnalytics);
        self.analytics.record(
            request.normalized_query(),
            request.filters(),
            response.response_time_ms,
        );

        log::debug!(
            "search '{}' returned {} of {} results in {:.2} ms",
            response.query,
            response.results.len(),
            response.total,
            response.response_time_ms
        );
        Ok(Self::finish(&events, response))
    }

    fn finish(events: &EventSink, response: SearchResponse) -> SearchResponse {
        events.emit(SearchEvent::Finished {
            total: response.total,
            cached: response.cached,
        });
        events.stage(SearchState::Done);
        response
    }

    /// Register a content source. Identifiers must be unique.
    pub fn register_source(&self, source: Arc<dyn ContentSource>) -> Result<()> {
        self.federator.register_source(source)
    }

    /// Remove a content source.
    pub fn unregister_source(&self, id: &str) -> Option<Arc<dyn ContentSource>> {
        self.federator.unregister_source(id)
    }

    /// Enable or disable a registered source.
    pub fn set_source_active(&self, id: &str, active: bool) -> Result<()> {
        self.federator.set_source_active(id, active)
    }

    pub fn source_ids(&self) -> Vec<String> {
        self.federator.source_ids()
    }

    /// Analytics totals, top terms and per-source statistics.
    pub fn get_analytics(&self) -> AnalyticsSnapshot {
        let mut snapshot = self.analytics.snapshot();
        snapshot.sources = self.federator.source_stats();
        snapshot
    }

    pub fn get_top_terms(&self, n: usize) -> Vec<TermCount> {
        self.analytics.get_top_terms(n)
    }

    /// Recent searches, newest first.
    pub fn get_history(&self) -> Vec<HistoryEntry> {
        self.analytics.history()
    }

    pub fn clear_history(&self) {
        self.analytics.clear_history();
    }

    /// Reset analytics and per-source statistics.
    pub fn reset_analytics(&self) {
        self.analytics.reset();
        self.federator.reset_stats();
    }

    /// Drop every cached response, e.g. after content changed.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Remove expired cache entries now.
    pub fn sweep_cache(&self) -> usize {
        self.cache.sweep()
    }

    /// Start the background cache sweeper on the current tokio runtime.
    ///
    /// Returns false if a sweeper is already running or caching is disabled.
    pub fn start_cache_sweeper(&self) -> bool {
        if !self.config.cache.enabled {
            return false;
        }
        let mut sweeper = self.sweeper.lock();
        if sweeper.as_ref().is_some_and(SweeperHandle::is_running) {
            return false;
        }
        *sweeper = Some(CacheSweeper::spawn(
            Arc::clone(&self.cache),
            self.config.cache.sweep_interval,
        ));
        true
    }

    /// Stop background work started by this orchestrator.
    pub async fn shutdown(&self) {
        let handle = self.sweeper.lock().take();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
    }
}

fn outcome_event(outcome: &SourceOutcome) -> SearchEvent {
    if outcome.is_success() {
        SearchEvent::SourceCompleted {
            source_id: outcome.source_id.clone(),
            task_id: outcome.task_id.clone(),
            items: outcome.hit_count(),
        }
    } else {
        SearchEvent::SourceDegraded {
            source_id: outcome.source_id.clone(),
            task_id: outcome.task_id.clone(),
            reason: outcome
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

//! In-memory content source.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::document::ResultItem;
use crate::error::{FedSearchError, Result};
use crate::federation::source::{ContentSource, SourceParams};
use crate::query::normalizer::tokenize;

const TITLE_WEIGHT: f64 = 3.0;
const BODY_WEIGHT: f64 = 1.0;

/// A content source backed by a list of items held in memory.
///
/// An item matches when every query token occurs, case-insensitively, in its
/// title, body or author. Items carrying a positive relevance score keep it;
/// otherwise the score counts token occurrences, weighting the title three
/// times the body.
///
/// Latency and failures can be injected to simulate a remote backend.
#[derive(Debug)]
pub struct MemorySource {
    id: String,
    items: RwLock<Vec<ResultItem>>,
    latency: Option<Duration>,
    failure: RwLock<Option<String>>,
    calls: AtomicU64,
}

impl MemorySource {
    pub fn new(id: impl Into<String>, items: Vec<ResultItem>) -> Self {
        Self {
            id: id.into(),
            items: RwLock::new(items),
            latency: None,
            failure: RwLock::new(None),
            calls: AtomicU64::new(0),
        }
    }

    /// Delay every search by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail every search with `message`.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.set_failure(Some(message.into()));
        self
    }

    /// Start or stop failing searches.
    pub fn set_failure(&self, message: Option<String>) {
        *self.failure.write() = message;
    }

    pub fn insert(&self, item: ResultItem) {
        self.items.write().push(item);
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Number of searches issued to this source.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn score(item: &ResultItem, tokens: &[&str]) -> Option<f64> {
        let title = item.title.to_lowercase();
        let body = item.body.to_lowercase();
        let author = item.author.to_lowercase();

        let mut occurrences = 0.0;
        for token in tokens {
            let in_title = title.matches(token).count();
            let in_body = body.matches(token).count();
            if in_title == 0 && in_body == 0 && !author.contains(token) {
                return None;
            }
            occurrences += in_title as f64 * TITLE_WEIGHT + in_body as f64 * BODY_WEIGHT;
        }

        if item.relevance_score > 0.0 {
            Some(item.relevance_score)
        } else {
            Some(occurrences)
        }
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn search(&self, query: &str, params: &SourceParams) -> Result<Vec<ResultItem>> {
        self.calls.fetch_add(1, Ordering::Relaxed);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(message) = self.failure.read().clone() {
            return Err(FedSearchError::source_failure(&self.id, message));
        }

        let query = query.to_lowercase();
        let tokens: Vec<&str> = tokenize(&query).collect();
        let items = self.items.read();
        let matches = items
            .iter()
            .filter_map(|item| {
                Self::score(item, &tokens).map(|score| {
                    let mut item = item.clone();
                    item.relevance_score = score;
                    item
                })
            })
            .take(params.max_results)
            .collect();
        Ok(matches)
    }
}

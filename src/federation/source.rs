//! Content sources and their registry.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::document::ResultItem;
use crate::error::{FedSearchError, Result};
use crate::search::filter::SearchFilters;

/// Parameters passed along with the query to every source.
#[derive(Debug, Clone, Default)]
pub struct SourceParams {
    /// The caller's filters. Sources may use them to narrow their own
    /// search; the engine re-applies them to whatever comes back.
    pub filters: SearchFilters,

    /// Maximum number of items the engine will keep from this source.
    pub max_results: usize,
}

/// An independent provider of searchable content.
///
/// Implementations own their transport and authentication. A returned
/// error marks the source as degraded for that call only.
#[async_trait]
pub trait ContentSource: Send + Sync + Debug {
    /// Stable identifier, unique among registered sources.
    fn id(&self) -> &str;

    /// Search for `query` (already normalized).
    async fn search(&self, query: &str, params: &SourceParams) -> Result<Vec<ResultItem>>;
}

/// A registered source with its bookkeeping.
#[derive(Debug, Clone)]
pub struct SourceHandle {
    /// Identifier copied from the source at registration.
    pub id: String,

    /// The source itself.
    pub source: Arc<dyn ContentSource>,

    /// Inactive sources are skipped by the federator.
    pub is_active: bool,
}

impl SourceHandle {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            id: source.id().to_string(),
            source,
            is_active: true,
        }
    }
}

/// Registry of content sources, kept in registration order.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: RwLock<Vec<SourceHandle>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source. Identifiers must be unique.
    pub fn register(&self, source: Arc<dyn ContentSource>) -> Result<()> {
        let handle = SourceHandle::new(source);
        if handle.id.is_empty() {
            return Err(FedSearchError::invalid_argument("source id must not be empty"));
        }

        let mut sources = self.sources.write();
        if sources.iter().any(|h| h.id == handle.id) {
            return Err(FedSearchError::invalid_argument(format!(
                "source '{}' is already registered",
                handle.id
            )));
        }

        log::debug!("registered content source '{}'", handle.id);
        sources.push(handle);
        Ok(())
    }

    /// Remove a source, returning it if it was registered.
    pub fn unregister(&self, id: &str) -> Option<Arc<dyn ContentSource>> {
        let mut sources = self.sources.write();
        let position = sources.iter().position(|h| h.id == id)?;
        Some(sources.remove(position).source)
    }

    /// Enable or disable a source without unregistering it.
    pub fn set_active(&self, id: &str, active: bool) -> Result<()> {
        let mut sources = self.sources.write();
        let handle = sources
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| FedSearchError::invalid_argument(format!("unknown source '{id}'")))?;
        handle.is_active = active;
        Ok(())
    }

    /// Snapshot of the active sources.
    pub fn active(&self) -> Vec<SourceHandle> {
        self.sources
            .read()
            .iter()
            .filter(|h| h.is_active)
            .cloned()
            .collect()
    }

    /// Identifiers of all registered sources.
    pub fn ids(&self) -> Vec<String> {
        self.sources.read().iter().map(|h| h.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.read().is_empty()
    }
}

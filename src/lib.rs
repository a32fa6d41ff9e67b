//! # fedsearch
//!
//! A federated search engine: one query fans out concurrently to every
//! registered content source, and the merged result set is filtered,
//! ranked, paginated, cached and recorded in usage analytics.
//!
//! ## Features
//!
//! - Concurrent fan-out with a shared deadline and cancellation
//! - Partial-failure tolerance with degraded-source reporting
//! - AND-across-keys / OR-within-key structured filters
//! - Relevance, date and locale-aware title ordering
//! - Time-expiring response cache with a background sweeper
//! - Popular terms, running response-time mean and bounded history
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fedsearch::prelude::*;
//!
//! # async fn run() -> fedsearch::error::Result<()> {
//! let orchestrator = SearchOrchestrator::new(EngineConfig::default());
//! orchestrator.register_source(Arc::new(MemorySource::new("articles", vec![])))?;
//!
//! let response = orchestrator
//!     .search(SearchParams::new("political theory").sort(SortStrategy::DateDesc))
//!     .await?;
//! println!("{} results", response.total);
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod cache;
pub mod cli;
pub mod document;
pub mod error;
pub mod federation;
pub mod orchestrator;
pub mod query;
pub mod search;
pub mod source;
pub mod util;

pub mod prelude {
    pub use crate::document::{Category, ContentType, Language, ResultItem};
    pub use crate::error::{FedSearchError, Result};
    pub use crate::federation::{ContentSource, SearchContext, SourceParams};
    pub use crate::orchestrator::{EngineConfig, SearchEvent, SearchOrchestrator, SearchState};
    pub use crate::search::{FilterValue, SearchFilters, SearchParams, SearchResponse, SortStrategy};
    pub use crate::source::MemorySource;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
